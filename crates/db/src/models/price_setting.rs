//! Price setting models: named, versioned bundles grouping one formula
//! (+ optional template) with an ordered parameter set.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use teklif_core::types::{DbId, Timestamp};

use crate::models::price_parameter::PriceParameter;

/// A pricing-configuration bundle, activated as a unit.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PriceSetting {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub version: i32,
    pub is_active: bool,
    pub supersedes_id: Option<DbId>,
    pub form_template_id: Option<DbId>,
    pub price_formula_id: DbId,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating a bundle.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePriceSetting {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub form_template_id: Option<DbId>,
    pub price_formula_id: DbId,
    pub created_by: Option<String>,
    /// Ordered parameter set, by parameter code.
    #[serde(default)]
    pub parameter_codes: Vec<String>,
}

/// Input for `create_new_version`; overrides display metadata on the copy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSettingVersion {
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_by: Option<String>,
}

/// A bundle with its ordered parameter definitions.
#[derive(Debug, Clone, Serialize)]
pub struct SettingWithParameters {
    #[serde(flatten)]
    pub setting: PriceSetting,
    pub parameters: Vec<PriceParameter>,
}
