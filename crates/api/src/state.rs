use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: teklif_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Event bus carrying quote-lifecycle events (e.g. approvals).
    pub event_bus: Arc<teklif_events::EventBus>,
}
