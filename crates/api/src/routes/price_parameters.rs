//! Route definitions for the `/price-parameters` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::price_parameters;
use crate::state::AppState;

/// Routes mounted at `/price-parameters`.
///
/// ```text
/// GET    /                          -> list
/// POST   /                          -> create
/// GET    /{id}                      -> get_by_id
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
/// GET    /{id}/lookups              -> list_lookups
/// POST   /{id}/lookups              -> add_lookup
/// DELETE /{id}/lookups/{lookup_id}  -> deactivate_lookup
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(price_parameters::list).post(price_parameters::create),
        )
        .route(
            "/{id}",
            get(price_parameters::get_by_id)
                .put(price_parameters::update)
                .delete(price_parameters::delete),
        )
        .route(
            "/{id}/lookups",
            get(price_parameters::list_lookups).post(price_parameters::add_lookup),
        )
        .route(
            "/{id}/lookups/{lookup_id}",
            delete(price_parameters::deactivate_lookup),
        )
}
