pub mod form_templates;
pub mod health;
pub mod price_formulas;
pub mod price_parameters;
pub mod price_settings;
pub mod quotes;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /form-templates                              list, create
/// /form-templates/active                       active template with fields
/// /form-templates/{id}                         get (with fields), delete
/// /form-templates/{id}/versions                new version (POST)
/// /form-templates/{id}/activate                activate (POST)
/// /form-templates/{id}/fields                  list, create field
/// /form-templates/{id}/fields/bulk             bulk create (POST)
/// /form-templates/{template_id}/fields/{id}    update, delete field
///
/// /price-parameters                            list, create
/// /price-parameters/{id}                       get, update, delete
/// /price-parameters/{id}/lookups               list, add lookup row
/// /price-parameters/{id}/lookups/{lookup_id}   deactivate (DELETE)
///
/// /price-formulas                              list, create
/// /price-formulas/active                       active formula with parameters
/// /price-formulas/{id}                         get (with parameters), delete
/// /price-formulas/{id}/versions                new version (POST)
/// /price-formulas/{id}/activate                activate (POST)
/// /price-formulas/{id}/calculate               dry-run calculation (POST)
///
/// /quotes                                      list, create
/// /quotes/statistics                           aggregates (?from, ?to)
/// /quotes/{id}                                 get (with details), update, delete
/// /quotes/{id}/status                          status change (PATCH)
/// /quotes/{id}/manual-price                    set (PATCH), clear (DELETE)
///
/// /price-settings                              list, create
/// /price-settings/active                       active bundle with parameters
/// /price-settings/{id}                         get (with parameters), delete
/// /price-settings/{id}/versions                deep-copy new version (POST)
/// /price-settings/{id}/activate                activate (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Form schema management: templates, fields, options.
        .nest("/form-templates", form_templates::router())
        // Pricing parameter definitions and lookup tables.
        .nest("/price-parameters", price_parameters::router())
        // Formula definitions, versioning, and dry-run calculation.
        .nest("/price-formulas", price_formulas::router())
        // Quote lifecycle: creation, pricing, status, statistics.
        .nest("/quotes", quotes::router())
        // Versioned formula+parameter bundles.
        .nest("/price-settings", price_settings::router())
}
