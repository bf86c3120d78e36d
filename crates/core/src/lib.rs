//! Pure domain logic for the Teklif quote-pricing engine.
//!
//! Nothing in this crate touches the database or the network. It provides:
//!
//! - [`types`] — shared id/timestamp aliases
//! - [`error`] — the [`CoreError`](error::CoreError) taxonomy
//! - [`formula`] — the restricted arithmetic formula evaluator
//! - [`pricing`] — parameter-resolution precedence and audit records
//! - [`quote_id`] — `TKF-YYYYMMDD-NNNN` quote-id formatting

pub mod error;
pub mod formula;
pub mod pricing;
pub mod quote_id;
pub mod types;
