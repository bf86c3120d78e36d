//! Price formula models: versioned arithmetic expressions and their
//! parameter links.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use teklif_core::types::{DbId, Timestamp};

use crate::models::price_parameter::PriceParameter;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A price formula row. Same single-active / per-code version chain
/// lifecycle as form templates.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PriceFormula {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub formula_expression: String,
    pub version: i32,
    pub is_active: bool,
    pub supersedes_id: Option<DbId>,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTOs
// ---------------------------------------------------------------------------

/// Input for creating a formula, optionally linking parameters by code.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePriceFormula {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub formula_expression: String,
    pub created_by: Option<String>,
    #[serde(default)]
    pub parameter_codes: Vec<String>,
}

/// Input for `create_new_version`; overrides the source's display metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewFormulaVersion {
    pub name: Option<String>,
    pub description: Option<String>,
    pub formula_expression: Option<String>,
    pub created_by: Option<String>,
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// A formula with its ordered parameter definitions.
#[derive(Debug, Clone, Serialize)]
pub struct FormulaWithParameters {
    #[serde(flatten)]
    pub formula: PriceFormula,
    pub parameters: Vec<PriceParameter>,
}
