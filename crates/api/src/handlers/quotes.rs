//! Handlers for the `/quotes` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use teklif_core::error::CoreError;
use teklif_db::models::quote::{
    CreateQuote, Quote, QuoteListParams, QuoteStatistics, QuoteStatus, QuoteWithDetails,
    StatisticsParams, UpdateQuote,
};
use teklif_db::repositories::QuoteRepo;
use teklif_events::QuoteEvent;

use crate::error::{AppError, AppResult};
use crate::extract::Json;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PATCH /quotes/{id}/status`.
///
/// The status travels as a plain string and is parsed here so an unknown
/// value produces a 400 rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub approved_by: Option<String>,
}

/// Request body for `PATCH /quotes/{id}/manual-price`.
#[derive(Debug, Deserialize)]
pub struct ManualPriceRequest {
    pub manual_price: f64,
    pub reason: Option<String>,
}

/// POST /api/v1/quotes
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateQuote>,
) -> AppResult<(StatusCode, Json<QuoteWithDetails>)> {
    let quote = QuoteRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(quote)))
}

/// GET /api/v1/quotes
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<QuoteListParams>,
) -> AppResult<Json<Vec<Quote>>> {
    if let Some(status) = params.status.as_deref() {
        if QuoteStatus::parse(status).is_none() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "unknown quote status '{status}'"
            ))));
        }
    }
    let quotes = QuoteRepo::list(&state.pool, &params).await?;
    Ok(Json(quotes))
}

/// GET /api/v1/quotes/statistics
pub async fn statistics(
    State(state): State<AppState>,
    Query(params): Query<StatisticsParams>,
) -> AppResult<Json<DataResponse<QuoteStatistics>>> {
    let stats = QuoteRepo::statistics(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/quotes/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<QuoteWithDetails>> {
    let quote = QuoteRepo::find_with_details(&state.pool, &id)
        .await?
        .ok_or_else(|| CoreError::not_found("Quote", &id))?;
    Ok(Json(quote))
}

/// PUT /api/v1/quotes/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateQuote>,
) -> AppResult<Json<QuoteWithDetails>> {
    let quote = QuoteRepo::update(&state.pool, &id, &input).await?;
    Ok(Json(quote))
}

/// PATCH /api/v1/quotes/{id}/status
///
/// Approving a quote publishes a `quote.approved` event for downstream
/// consumers.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<Json<Quote>> {
    let status = QuoteStatus::parse(&input.status).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "unknown quote status '{}'",
            input.status
        )))
    })?;

    let quote =
        QuoteRepo::update_status(&state.pool, &id, status, input.approved_by.as_deref()).await?;

    if status == QuoteStatus::Approved {
        let mut event =
            QuoteEvent::new(QuoteEvent::APPROVED, quote.id.as_str()).with_payload(json!({
                "final_price": quote.final_price,
                "customer_name": quote.customer_name,
            }));
        if let Some(actor) = &quote.approved_by {
            event = event.with_actor(actor.as_str());
        }
        state.event_bus.publish(event);
    }

    Ok(Json(quote))
}

/// PATCH /api/v1/quotes/{id}/manual-price
pub async fn set_manual_price(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ManualPriceRequest>,
) -> AppResult<Json<Quote>> {
    let quote = QuoteRepo::set_manual_price(
        &state.pool,
        &id,
        input.manual_price,
        input.reason.as_deref(),
    )
    .await?;
    Ok(Json(quote))
}

/// DELETE /api/v1/quotes/{id}/manual-price
pub async fn clear_manual_price(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Quote>> {
    let quote = QuoteRepo::clear_manual_price(&state.pool, &id).await?;
    Ok(Json(quote))
}

/// DELETE /api/v1/quotes/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<StatusCode> {
    QuoteRepo::delete(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
