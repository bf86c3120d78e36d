//! Handlers for the `/price-parameters` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use teklif_core::error::CoreError;
use teklif_core::types::DbId;
use teklif_db::models::price_parameter::{
    CreatePriceParameter, CreatePriceParameterLookup, PriceParameter, PriceParameterLookup,
    UpdatePriceParameter,
};
use teklif_db::repositories::PriceParameterRepo;

use crate::error::AppResult;
use crate::extract::Json;
use crate::state::AppState;

/// POST /api/v1/price-parameters
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePriceParameter>,
) -> AppResult<(StatusCode, Json<PriceParameter>)> {
    let parameter = PriceParameterRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(parameter)))
}

/// GET /api/v1/price-parameters
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<PriceParameter>>> {
    let parameters = PriceParameterRepo::list(&state.pool).await?;
    Ok(Json(parameters))
}

/// GET /api/v1/price-parameters/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PriceParameter>> {
    let parameter = PriceParameterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("PriceParameter", id))?;
    Ok(Json(parameter))
}

/// PUT /api/v1/price-parameters/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePriceParameter>,
) -> AppResult<Json<PriceParameter>> {
    let parameter = PriceParameterRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("PriceParameter", id))?;
    Ok(Json(parameter))
}

/// DELETE /api/v1/price-parameters/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    PriceParameterRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/price-parameters/{id}/lookups
pub async fn add_lookup(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreatePriceParameterLookup>,
) -> AppResult<(StatusCode, Json<PriceParameterLookup>)> {
    let lookup = PriceParameterRepo::add_lookup(&state.pool, id, &input).await?;
    Ok((StatusCode::CREATED, Json(lookup)))
}

/// GET /api/v1/price-parameters/{id}/lookups
pub async fn list_lookups(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<PriceParameterLookup>>> {
    let lookups = PriceParameterRepo::list_lookups(&state.pool, id).await?;
    Ok(Json(lookups))
}

/// DELETE /api/v1/price-parameters/{id}/lookups/{lookup_id}
pub async fn deactivate_lookup(
    State(state): State<AppState>,
    Path((_id, lookup_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    PriceParameterRepo::deactivate_lookup(&state.pool, lookup_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
