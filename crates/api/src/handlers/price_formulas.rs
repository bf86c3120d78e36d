//! Handlers for the `/price-formulas` resource.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use teklif_core::error::CoreError;
use teklif_core::types::DbId;
use teklif_db::models::price_formula::{
    CreatePriceFormula, FormulaWithParameters, NewFormulaVersion, PriceFormula,
};
use teklif_db::pricing::{self, CalculationOutcome};
use teklif_db::repositories::PriceFormulaRepo;

use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the dry-run calculation endpoint.
#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    /// Submitted answers keyed by field code. Required.
    pub form_data: Option<HashMap<String, String>>,
}

/// POST /api/v1/price-formulas
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePriceFormula>,
) -> AppResult<(StatusCode, Json<FormulaWithParameters>)> {
    let formula = PriceFormulaRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(formula)))
}

/// GET /api/v1/price-formulas
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<PriceFormula>>> {
    let formulas = PriceFormulaRepo::list(&state.pool).await?;
    Ok(Json(formulas))
}

/// GET /api/v1/price-formulas/active
pub async fn get_active(State(state): State<AppState>) -> AppResult<Json<FormulaWithParameters>> {
    let active = PriceFormulaRepo::find_active(&state.pool)
        .await?
        .ok_or_else(|| CoreError::not_found("PriceFormula", "active"))?;
    let with_parameters = PriceFormulaRepo::find_with_parameters(&state.pool, active.id)
        .await?
        .ok_or_else(|| CoreError::not_found("PriceFormula", active.id))?;
    Ok(Json(with_parameters))
}

/// GET /api/v1/price-formulas/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<FormulaWithParameters>> {
    let formula = PriceFormulaRepo::find_with_parameters(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("PriceFormula", id))?;
    Ok(Json(formula))
}

/// POST /api/v1/price-formulas/{id}/versions
pub async fn create_version(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<NewFormulaVersion>,
) -> AppResult<(StatusCode, Json<PriceFormula>)> {
    let next = PriceFormulaRepo::create_new_version(&state.pool, id, &input).await?;
    Ok((StatusCode::CREATED, Json(next)))
}

/// POST /api/v1/price-formulas/{id}/activate
pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PriceFormula>> {
    let formula = PriceFormulaRepo::activate(&state.pool, id).await?;
    Ok(Json(formula))
}

/// DELETE /api/v1/price-formulas/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    PriceFormulaRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/price-formulas/{id}/calculate
///
/// Runs the pricing pipeline against the submitted form data without
/// writing a quote.
pub async fn calculate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CalculateRequest>,
) -> AppResult<Json<DataResponse<CalculationOutcome>>> {
    let form_data = input.form_data.ok_or_else(|| {
        AppError::Core(CoreError::Validation("form_data is required".into()))
    })?;

    let formula = PriceFormulaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("PriceFormula", id))?;

    let mut conn = state.pool.acquire().await?;
    let outcome = pricing::calculate(&mut conn, &formula, &form_data).await?;
    Ok(Json(DataResponse { data: outcome }))
}
