//! Route definitions for the `/quotes` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::quotes;
use crate::state::AppState;

/// Routes mounted at `/quotes`.
///
/// ```text
/// GET    /                    -> list (?status, ?limit, ?offset)
/// POST   /                    -> create
/// GET    /statistics          -> statistics (?from, ?to)
/// GET    /{id}                -> get_by_id (with form data + price details)
/// PUT    /{id}                -> update
/// DELETE /{id}                -> delete (admin hard delete)
/// PATCH  /{id}/status         -> update_status
/// PATCH  /{id}/manual-price   -> set_manual_price
/// DELETE /{id}/manual-price   -> clear_manual_price
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(quotes::list).post(quotes::create))
        .route("/statistics", get(quotes::statistics))
        .route(
            "/{id}",
            get(quotes::get_by_id)
                .put(quotes::update)
                .delete(quotes::delete),
        )
        .route("/{id}/status", patch(quotes::update_status))
        .route(
            "/{id}/manual-price",
            patch(quotes::set_manual_price).delete(quotes::clear_manual_price),
        )
}
