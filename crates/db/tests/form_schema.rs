//! Integration tests for form template, field, and option management:
//! version chaining with structural copies, global activation, and
//! reference-protected deletion.

use assert_matches::assert_matches;
use sqlx::PgPool;
use teklif_core::error::CoreError;
use teklif_db::error::StoreError;
use teklif_db::models::form_template::{
    CreateFieldOption, CreateFormField, CreateFormTemplate, NewTemplateVersion, UpdateFormField,
};
use teklif_db::repositories::{FormFieldRepo, FormTemplateRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_template(code: &str) -> CreateFormTemplate {
    CreateFormTemplate {
        code: code.to_string(),
        name: format!("{code} form"),
        description: None,
        version: None,
        is_active: None,
        created_by: None,
    }
}

fn new_field(code: &str, field_type: &str) -> CreateFormField {
    CreateFormField {
        field_code: code.to_string(),
        field_name: code.replace('_', " "),
        field_type: field_type.to_string(),
        sort_order: None,
        is_required: None,
        validation_rule: None,
        default_value: None,
        options: Vec::new(),
    }
}

fn option(value: &str) -> CreateFieldOption {
    CreateFieldOption {
        option_value: value.to_string(),
        option_label: value.to_string(),
        sort_order: None,
        is_active: None,
        price_value: None,
    }
}

// ---------------------------------------------------------------------------
// Test: created templates start at version 1, inactive
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_template_defaults(pool: PgPool) {
    let template = FormTemplateRepo::create(&pool, &new_template("standard"))
        .await
        .unwrap();

    assert_eq!(template.version, 1);
    assert!(!template.is_active);
    assert_eq!(template.supersedes_id, None);
}

// ---------------------------------------------------------------------------
// Test: versioning copies fields and re-parents options
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_version_copies_field_tree(pool: PgPool) {
    let template = FormTemplateRepo::create(&pool, &new_template("standard"))
        .await
        .unwrap();

    let mut material = new_field("material", "select");
    material.options = vec![option("steel"), option("aluminum")];
    FormFieldRepo::create(&pool, template.id, &material)
        .await
        .unwrap();
    FormFieldRepo::create(&pool, template.id, &new_field("qty", "number"))
        .await
        .unwrap();

    let next =
        FormTemplateRepo::create_new_version(&pool, template.id, &NewTemplateVersion::default())
            .await
            .unwrap();

    assert_eq!(next.version, 2);
    assert_eq!(next.supersedes_id, Some(template.id));
    assert_eq!(next.code, template.code);

    // The source is deactivated by versioning.
    let source = FormTemplateRepo::find_by_id(&pool, template.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!source.is_active);

    // The copy has its own field rows with its own options.
    let copied = FormTemplateRepo::find_with_fields(&pool, next.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(copied.fields.len(), 2);
    let material_copy = copied
        .fields
        .iter()
        .find(|f| f.field.field_code == "material")
        .unwrap();
    assert_eq!(material_copy.options.len(), 2);
    assert_ne!(material_copy.field.id, 0);

    // Copied options hang off the new field rows, not the old ones.
    let originals = FormTemplateRepo::find_with_fields(&pool, template.id)
        .await
        .unwrap()
        .unwrap();
    let material_original = originals
        .fields
        .iter()
        .find(|f| f.field.field_code == "material")
        .unwrap();
    assert_ne!(material_copy.field.id, material_original.field.id);
    assert_eq!(material_original.options.len(), 2);
}

// ---------------------------------------------------------------------------
// Test: activation deactivates every other template
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_activation_is_globally_exclusive(pool: PgPool) {
    let a = FormTemplateRepo::create(&pool, &new_template("form-a"))
        .await
        .unwrap();
    let b = FormTemplateRepo::create(&pool, &new_template("form-b"))
        .await
        .unwrap();

    FormTemplateRepo::activate(&pool, a.id).await.unwrap();
    FormTemplateRepo::activate(&pool, b.id).await.unwrap();

    let active = FormTemplateRepo::find_active(&pool).await.unwrap().unwrap();
    assert_eq!(active.id, b.id);

    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM form_templates WHERE is_active")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_activate_unknown_template_is_not_found(pool: PgPool) {
    let err = FormTemplateRepo::activate(&pool, 999_999).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Test: deletion is blocked while quotes reference the template
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_referenced_template_conflicts(pool: PgPool) {
    let template = FormTemplateRepo::create(&pool, &new_template("standard"))
        .await
        .unwrap();

    sqlx::query(
        "INSERT INTO quotes (id, customer_name, customer_email, form_template_id)
         VALUES ('TKF-20260101-0001', 'Test', 'test@example.com', $1)",
    )
    .bind(template.id)
    .execute(&pool)
    .await
    .unwrap();

    let err = FormTemplateRepo::delete(&pool, template.id).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));

    // Still present after the failed delete.
    assert!(FormTemplateRepo::find_by_id(&pool, template.id)
        .await
        .unwrap()
        .is_some());
}

// ---------------------------------------------------------------------------
// Test: bulk field creation rolls back as a unit
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bulk_create_rolls_back_on_duplicate(pool: PgPool) {
    let template = FormTemplateRepo::create(&pool, &new_template("standard"))
        .await
        .unwrap();

    let inputs = vec![new_field("material", "select"), new_field("material", "text")];
    let result = FormFieldRepo::create_bulk(&pool, template.id, &inputs).await;
    assert!(result.is_err());

    let fields = FormFieldRepo::list_for_template(&pool, template.id)
        .await
        .unwrap();
    assert!(fields.is_empty());
}

// ---------------------------------------------------------------------------
// Test: field patch only touches supplied columns
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_field_update_is_partial(pool: PgPool) {
    let template = FormTemplateRepo::create(&pool, &new_template("standard"))
        .await
        .unwrap();
    let created = FormFieldRepo::create(&pool, template.id, &new_field("qty", "number"))
        .await
        .unwrap();

    let patch = UpdateFormField {
        is_required: Some(true),
        ..Default::default()
    };
    let updated = FormFieldRepo::update(&pool, created.field.id, &patch)
        .await
        .unwrap()
        .unwrap();

    assert!(updated.is_required);
    assert_eq!(updated.field_type, "number");
    assert_eq!(updated.field_name, created.field.field_name);
}
