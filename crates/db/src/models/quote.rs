//! Quote models: the quote record, its EAV form answers, the per-parameter
//! price audit trail, and the status enums.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use teklif_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Status enums
// ---------------------------------------------------------------------------

/// Quote lifecycle status. Transition direction is caller policy; the store
/// only validates membership and stamps approval metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    New,
    Pending,
    Approved,
    Rejected,
}

impl QuoteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Self::New),
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Whether `final_price` tracks the calculation or a manual override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceStatus {
    Current,
    Manual,
}

impl PriceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Manual => "manual",
        }
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A quote row. The id is the formatted `TKF-YYYYMMDD-NNNN` identifier.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub company_name: Option<String>,
    pub form_template_id: Option<DbId>,
    pub price_formula_id: Option<DbId>,
    pub status: String,
    pub calculated_price: Option<f64>,
    pub manual_price: Option<f64>,
    pub manual_price_reason: Option<String>,
    pub final_price: Option<f64>,
    pub price_status: String,
    pub price_calculated_at: Option<Timestamp>,
    pub approved_at: Option<Timestamp>,
    pub approved_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One submitted form answer, keyed by field code, value stored as text.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuoteFormData {
    pub id: DbId,
    pub quote_id: String,
    pub field_code: String,
    pub field_value: String,
}

/// One audit row recording how a parameter contributed to the stored price.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuotePriceDetail {
    pub id: DbId,
    pub quote_id: String,
    pub parameter_code: String,
    pub parameter_name: String,
    pub parameter_value: f64,
    /// One of `fixed`, `lookup`, `form`.
    pub source: String,
    pub sort_order: i32,
}

// ---------------------------------------------------------------------------
// Create / update DTOs
// ---------------------------------------------------------------------------

/// Input for creating a quote.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuote {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub company_name: Option<String>,
    /// Explicit template; defaults to the active one when form data is given.
    pub form_template_id: Option<DbId>,
    /// Explicit formula; defaults to the active one.
    pub price_formula_id: Option<DbId>,
    pub notes: Option<String>,
    /// Submitted answers keyed by field code. Keys not present in the
    /// resolved template are silently dropped.
    pub form_data: Option<HashMap<String, String>>,
}

/// Patch input for a quote. Supplying `form_data` replaces all stored
/// answers and triggers recalculation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQuote {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub company_name: Option<String>,
    pub notes: Option<String>,
    pub form_data: Option<HashMap<String, String>>,
}

/// Optional filters for quote listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Optional `created_at` range for statistics.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatisticsParams {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// A quote with its form answers and price audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteWithDetails {
    #[serde(flatten)]
    pub quote: Quote,
    pub form_data: Vec<QuoteFormData>,
    pub price_details: Vec<QuotePriceDetail>,
}

/// Per-status bucket of the statistics aggregate.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusBucket {
    pub status: String,
    pub count: i64,
    pub total_final_price: Option<f64>,
}

/// Aggregate counts and sums over quotes, optionally date-ranged.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteStatistics {
    pub by_status: Vec<StatusBucket>,
    pub total_count: i64,
    pub total_final_price: f64,
}
