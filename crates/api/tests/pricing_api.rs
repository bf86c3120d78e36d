//! HTTP-level integration tests for price parameters, formulas, and the
//! dry-run calculation endpoint.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, put_json};
use sqlx::PgPool;

/// Seed the canonical pricing setup:
///
/// - `material_cost`: form_lookup, field `material`, steel -> 50
/// - `labor_cost`: fixed 100
/// - formula `standard`: `material_cost * qty + labor_cost`
///
/// Returns the formula id.
async fn seed_pricing(pool: &PgPool) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/price-parameters",
        serde_json::json!({
            "code": "material_cost",
            "name": "Material Cost",
            "parameter_type": "form_lookup"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let material = body_json(response).await;
    let material_id = material["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/price-parameters/{material_id}/lookups"),
        serde_json::json!({
            "form_field_code": "material",
            "option_value": "steel",
            "price_value": 50.0
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/price-parameters",
        serde_json::json!({
            "code": "labor_cost",
            "name": "Labor Cost",
            "parameter_type": "fixed",
            "fixed_value": 100.0
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/price-formulas",
        serde_json::json!({
            "code": "standard",
            "name": "Standard Pricing",
            "formula_expression": "material_cost * qty + labor_cost",
            "parameter_codes": ["material_cost", "labor_cost"]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let formula = body_json(response).await;
    formula["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_fixed_parameter_without_value_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/price-parameters",
        serde_json::json!({
            "code": "labor_cost",
            "name": "Labor Cost",
            "parameter_type": "fixed"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_parameter_code_returns_409(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "code": "labor_cost",
        "name": "Labor Cost",
        "parameter_type": "fixed",
        "fixed_value": 100.0
    });
    let response = post_json(app, "/api/v1/price-parameters", body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/price-parameters", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lookup_on_fixed_parameter_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let created = body_json(
        post_json(
            app,
            "/api/v1/price-parameters",
            serde_json::json!({
                "code": "labor_cost",
                "name": "Labor Cost",
                "parameter_type": "fixed",
                "fixed_value": 100.0
            }),
        )
        .await,
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/price-parameters/{id}/lookups"),
        serde_json::json!({
            "form_field_code": "labor",
            "option_value": "basic",
            "price_value": 10.0
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_parameter(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let created = body_json(
        post_json(
            app,
            "/api/v1/price-parameters",
            serde_json::json!({
                "code": "labor_cost",
                "name": "Labor Cost",
                "parameter_type": "fixed",
                "fixed_value": 100.0
            }),
        )
        .await,
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/v1/price-parameters/{id}"),
        serde_json::json!({"fixed_value": 120.0, "unit": "TRY/h"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["fixed_value"], 120.0);
    assert_eq!(updated["unit"], "TRY/h");
    // Untouched columns survive the patch.
    assert_eq!(updated["name"], "Labor Cost");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_parameter_referenced_by_formula_returns_409(pool: PgPool) {
    seed_pricing(&pool).await;

    let app = common::build_test_app(pool.clone());
    let parameters = body_json(get(app, "/api/v1/price-parameters").await).await;
    let material_id = parameters
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["code"] == "material_cost")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let app = common::build_test_app(pool);
    let response = delete(app, &format!("/api/v1/price-parameters/{material_id}")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_formula_with_unknown_parameter_code_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/price-formulas",
        serde_json::json!({
            "code": "standard",
            "name": "Standard",
            "formula_expression": "material_cost * qty",
            "parameter_codes": ["material_cost"]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_formula_includes_ordered_parameters(pool: PgPool) {
    let id = seed_pricing(&pool).await;

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/price-formulas/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["formula_expression"], "material_cost * qty + labor_cost");
    let parameters = json["parameters"].as_array().unwrap();
    assert_eq!(parameters.len(), 2);
    assert_eq!(parameters[0]["code"], "material_cost");
    assert_eq!(parameters[1]["code"], "labor_cost");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_formula_versioning_and_activation(pool: PgPool) {
    let id = seed_pricing(&pool).await;

    let app = common::build_test_app(pool.clone());
    post_json(app, &format!("/api/v1/price-formulas/{id}/activate"), serde_json::json!({})).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/price-formulas/{id}/versions"),
        serde_json::json!({"formula_expression": "material_cost * qty * 2 + labor_cost"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let next = body_json(response).await;
    assert_eq!(next["version"], 2);
    assert_eq!(next["supersedes_id"], id);
    assert_eq!(next["is_active"], false);
    let next_id = next["id"].as_i64().unwrap();

    // Versioning deactivated the source: no formula is active.
    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/price-formulas/active").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The copy keeps the source's parameter links.
    let app = common::build_test_app(pool.clone());
    let copied = body_json(get(app, &format!("/api/v1/price-formulas/{next_id}")).await).await;
    assert_eq!(copied["parameters"].as_array().unwrap().len(), 2);

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/price-formulas/{next_id}/activate"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let active = body_json(get(app, "/api/v1/price-formulas/active").await).await;
    assert_eq!(active["id"], next_id);
}

// ---------------------------------------------------------------------------
// Dry-run calculation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_calculate_resolves_lookup_fixed_and_form_values(pool: PgPool) {
    let id = seed_pricing(&pool).await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/price-formulas/{id}/calculate"),
        serde_json::json!({"form_data": {"material": "steel", "qty": "100"}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["total_price"], 5100.0);
    assert_eq!(data["evaluated_formula"], "50 * 100 + 100");
    assert_eq!(data["parameter_values"]["material_cost"], 50.0);
    assert_eq!(data["parameter_values"]["labor_cost"], 100.0);

    let details = data["calculation_details"].as_array().unwrap();
    assert_eq!(details.len(), 2);
    assert_eq!(details[0]["code"], "material_cost");
    assert_eq!(details[0]["source"], "lookup");
    assert_eq!(details[1]["source"], "fixed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_calculate_without_form_data_returns_400(pool: PgPool) {
    let id = seed_pricing(&pool).await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/price-formulas/{id}/calculate"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_calculate_with_unknown_identifier_returns_422(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let created = body_json(
        post_json(
            app,
            "/api/v1/price-formulas",
            serde_json::json!({
                "code": "broken",
                "name": "Broken",
                "formula_expression": "undefined_thing * 2"
            }),
        )
        .await,
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/price-formulas/{id}/calculate"),
        serde_json::json!({"form_data": {}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FORMULA_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_lookup_resolves_to_zero(pool: PgPool) {
    let id = seed_pricing(&pool).await;

    // "titanium" has no lookup row; material_cost resolves to 0.
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/price-formulas/{id}/calculate"),
        serde_json::json!({"form_data": {"material": "titanium", "qty": "100"}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["total_price"], 100.0);
    assert_eq!(json["data"]["parameter_values"]["material_cost"], 0.0);
}

// ---------------------------------------------------------------------------
// Price settings (bundles)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_setting_version_deep_copies_formula(pool: PgPool) {
    let formula_id = seed_pricing(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/price-settings",
        serde_json::json!({
            "code": "bundle-2026",
            "name": "2026 Pricing",
            "price_formula_id": formula_id,
            "parameter_codes": ["material_cost", "labor_cost"]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let setting = body_json(response).await;
    let setting_id = setting["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/price-settings/{setting_id}/versions"),
        serde_json::json!({"name": "2027 Pricing"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let next = body_json(response).await;
    assert_eq!(next["version"], 2);
    assert_eq!(next["supersedes_id"], setting_id);

    // The copy points at a freshly cloned formula row, not the original.
    let cloned_formula_id = next["price_formula_id"].as_i64().unwrap();
    assert_ne!(cloned_formula_id, formula_id);

    // The clone carries the expression and parameter links.
    let app = common::build_test_app(pool);
    let clone =
        body_json(get(app, &format!("/api/v1/price-formulas/{cloned_formula_id}")).await).await;
    assert_eq!(clone["formula_expression"], "material_cost * qty + labor_cost");
    assert_eq!(clone["parameters"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_setting_activation_is_globally_exclusive(pool: PgPool) {
    let formula_id = seed_pricing(&pool).await;

    let mut ids = Vec::new();
    for code in ["bundle-a", "bundle-b"] {
        let app = common::build_test_app(pool.clone());
        let created = body_json(
            post_json(
                app,
                "/api/v1/price-settings",
                serde_json::json!({
                    "code": code,
                    "name": code,
                    "price_formula_id": formula_id
                }),
            )
            .await,
        )
        .await;
        ids.push(created["id"].as_i64().unwrap());
    }

    for id in &ids {
        let app = common::build_test_app(pool.clone());
        let response =
            post_json(app, &format!("/api/v1/price-settings/{id}/activate"), serde_json::json!({}))
                .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let app = common::build_test_app(pool);
    let active = body_json(get(app, "/api/v1/price-settings/active").await).await;
    assert_eq!(active["id"], ids[1]);
}
