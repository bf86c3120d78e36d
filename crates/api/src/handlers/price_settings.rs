//! Handlers for the `/price-settings` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use teklif_core::error::CoreError;
use teklif_core::types::DbId;
use teklif_db::models::price_setting::{
    CreatePriceSetting, NewSettingVersion, PriceSetting, SettingWithParameters,
};
use teklif_db::repositories::PriceSettingRepo;

use crate::error::AppResult;
use crate::extract::Json;
use crate::state::AppState;

/// POST /api/v1/price-settings
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePriceSetting>,
) -> AppResult<(StatusCode, Json<SettingWithParameters>)> {
    let setting = PriceSettingRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(setting)))
}

/// GET /api/v1/price-settings
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<PriceSetting>>> {
    let settings = PriceSettingRepo::list(&state.pool).await?;
    Ok(Json(settings))
}

/// GET /api/v1/price-settings/active
pub async fn get_active(State(state): State<AppState>) -> AppResult<Json<SettingWithParameters>> {
    let active = PriceSettingRepo::find_active(&state.pool)
        .await?
        .ok_or_else(|| CoreError::not_found("PriceSetting", "active"))?;
    let with_parameters = PriceSettingRepo::find_with_parameters(&state.pool, active.id)
        .await?
        .ok_or_else(|| CoreError::not_found("PriceSetting", active.id))?;
    Ok(Json(with_parameters))
}

/// GET /api/v1/price-settings/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<SettingWithParameters>> {
    let setting = PriceSettingRepo::find_with_parameters(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("PriceSetting", id))?;
    Ok(Json(setting))
}

/// POST /api/v1/price-settings/{id}/versions
pub async fn create_version(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<NewSettingVersion>,
) -> AppResult<(StatusCode, Json<PriceSetting>)> {
    let next = PriceSettingRepo::create_new_version(&state.pool, id, &input).await?;
    Ok((StatusCode::CREATED, Json(next)))
}

/// POST /api/v1/price-settings/{id}/activate
pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PriceSetting>> {
    let setting = PriceSettingRepo::activate(&state.pool, id).await?;
    Ok(Json(setting))
}

/// DELETE /api/v1/price-settings/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    PriceSettingRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
