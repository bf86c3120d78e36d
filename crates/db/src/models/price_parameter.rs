//! Pricing parameter models: definitions and their lookup rows.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use teklif_core::pricing::{ParameterDefinition, ParameterType};
use teklif_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A pricing input definition. Stateless: resolution is computed per quote
/// calculation and never stored on the parameter.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PriceParameter {
    pub id: DbId,
    pub code: String,
    pub name: String,
    /// One of `fixed`, `form_lookup`, `calculated` (TEXT + CHECK column).
    pub parameter_type: String,
    pub fixed_value: Option<f64>,
    pub form_field_code: Option<String>,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PriceParameter {
    /// The parsed parameter type; `None` only if the row predates the CHECK
    /// constraint.
    pub fn kind(&self) -> Option<ParameterType> {
        ParameterType::parse(&self.parameter_type)
    }

    /// Detach into the pure resolution input used by `teklif_core::pricing`.
    pub fn to_definition(&self) -> Option<ParameterDefinition> {
        Some(ParameterDefinition {
            code: self.code.clone(),
            name: self.name.clone(),
            parameter_type: self.kind()?,
            fixed_value: self.fixed_value,
            form_field_code: self.form_field_code.clone(),
        })
    }
}

/// A time-bounded mapping from a submitted form option to a price
/// contribution, owned by a `form_lookup` parameter.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PriceParameterLookup {
    pub id: DbId,
    pub price_parameter_id: DbId,
    pub form_field_code: String,
    pub option_value: String,
    pub price_value: f64,
    pub currency: String,
    pub valid_from: Timestamp,
    pub valid_to: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create / update DTOs
// ---------------------------------------------------------------------------

/// Input for creating a parameter definition.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePriceParameter {
    pub code: String,
    pub name: String,
    pub parameter_type: ParameterType,
    pub fixed_value: Option<f64>,
    pub form_field_code: Option<String>,
    pub unit: Option<String>,
    pub description: Option<String>,
}

/// Patch input for a parameter definition. The type itself is immutable
/// once created; lookups and values may change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePriceParameter {
    pub name: Option<String>,
    pub fixed_value: Option<f64>,
    pub form_field_code: Option<String>,
    pub unit: Option<String>,
    pub description: Option<String>,
}

/// Input for adding a lookup row to a `form_lookup` parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePriceParameterLookup {
    pub form_field_code: String,
    pub option_value: String,
    pub price_value: f64,
    pub currency: Option<String>,
    pub valid_from: Option<Timestamp>,
    pub valid_to: Option<Timestamp>,
    pub is_active: Option<bool>,
}
