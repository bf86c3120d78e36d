//! Route definitions for the `/price-formulas` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::price_formulas;
use crate::state::AppState;

/// Routes mounted at `/price-formulas`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// GET    /active           -> get_active
/// GET    /{id}             -> get_by_id (with parameters)
/// DELETE /{id}             -> delete
/// POST   /{id}/versions    -> create_version
/// POST   /{id}/activate    -> activate
/// POST   /{id}/calculate   -> calculate (dry run, no quote written)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(price_formulas::list).post(price_formulas::create))
        .route("/active", get(price_formulas::get_active))
        .route(
            "/{id}",
            get(price_formulas::get_by_id).delete(price_formulas::delete),
        )
        .route("/{id}/versions", post(price_formulas::create_version))
        .route("/{id}/activate", post(price_formulas::activate))
        .route("/{id}/calculate", post(price_formulas::calculate))
}
