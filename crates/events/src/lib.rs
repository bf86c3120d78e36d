//! Teklif quote event bus.
//!
//! Quote-lifecycle notifications for downstream consumers. The engine only
//! publishes here; what consumes an approval (work-order creation etc.) is
//! out of scope and subscribes on its own.

pub mod bus;

pub use bus::{EventBus, QuoteEvent};
