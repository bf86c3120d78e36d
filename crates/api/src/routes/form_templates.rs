//! Route definitions for the `/form-templates` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::form_templates;
use crate::state::AppState;

/// Routes mounted at `/form-templates`.
///
/// ```text
/// GET    /                               -> list
/// POST   /                               -> create
/// GET    /active                         -> get_active
/// GET    /{id}                           -> get_by_id (with fields)
/// DELETE /{id}                           -> delete
/// POST   /{id}/versions                  -> create_version
/// POST   /{id}/activate                  -> activate
/// GET    /{id}/fields                    -> list_fields
/// POST   /{id}/fields                    -> create_field
/// POST   /{id}/fields/bulk               -> create_fields_bulk
/// PUT    /{template_id}/fields/{id}      -> update_field
/// DELETE /{template_id}/fields/{id}      -> delete_field
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(form_templates::list).post(form_templates::create),
        )
        .route("/active", get(form_templates::get_active))
        .route(
            "/{id}",
            get(form_templates::get_by_id).delete(form_templates::delete),
        )
        .route("/{id}/versions", post(form_templates::create_version))
        .route("/{id}/activate", post(form_templates::activate))
        .route(
            "/{id}/fields",
            get(form_templates::list_fields).post(form_templates::create_field),
        )
        .route("/{id}/fields/bulk", post(form_templates::create_fields_bulk))
        .route(
            "/{template_id}/fields/{id}",
            put(form_templates::update_field).delete(form_templates::delete_field),
        )
}
