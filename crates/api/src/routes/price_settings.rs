//! Route definitions for the `/price-settings` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::price_settings;
use crate::state::AppState;

/// Routes mounted at `/price-settings`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create
/// GET    /active         -> get_active
/// GET    /{id}           -> get_by_id (with parameters)
/// DELETE /{id}           -> delete
/// POST   /{id}/versions  -> create_version (deep copy incl. formula)
/// POST   /{id}/activate  -> activate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(price_settings::list).post(price_settings::create))
        .route("/active", get(price_settings::get_active))
        .route(
            "/{id}",
            get(price_settings::get_by_id).delete(price_settings::delete),
        )
        .route("/{id}/versions", post(price_settings::create_version))
        .route("/{id}/activate", post(price_settings::activate))
}
