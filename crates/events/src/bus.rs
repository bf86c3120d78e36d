//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`QuoteEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// QuoteEvent
// ---------------------------------------------------------------------------

/// A quote-lifecycle event.
///
/// Constructed via [`QuoteEvent::new`] and enriched with
/// [`with_actor`](QuoteEvent::with_actor) and
/// [`with_payload`](QuoteEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteEvent {
    /// Dot-separated event name, e.g. `"quote.approved"`.
    pub event_type: String,

    /// The quote's formatted id (`TKF-YYYYMMDD-NNNN`).
    pub quote_id: String,

    /// Who triggered the event, when known.
    pub actor: Option<String>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl QuoteEvent {
    /// Event name published when a quote enters the `approved` status.
    pub const APPROVED: &'static str = "quote.approved";

    pub fn new(event_type: impl Into<String>, quote_id: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            quote_id: quote_id.into(),
            actor: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`QuoteEvent`].
pub struct EventBus {
    sender: broadcast::Sender<QuoteEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: QuoteEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<QuoteEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = QuoteEvent::new(QuoteEvent::APPROVED, "TKF-20260829-0001")
            .with_actor("ops@example.com")
            .with_payload(serde_json::json!({"final_price": 4800.0}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "quote.approved");
        assert_eq!(received.quote_id, "TKF-20260829-0001");
        assert_eq!(received.actor.as_deref(), Some("ops@example.com"));
        assert_eq!(received.payload["final_price"], 4800.0);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(QuoteEvent::new(QuoteEvent::APPROVED, "TKF-20260829-0002"));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.quote_id, "TKF-20260829-0002");
        assert_eq!(e2.quote_id, "TKF-20260829-0002");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        // No subscribers — this must not panic.
        bus.publish(QuoteEvent::new(QuoteEvent::APPROVED, "TKF-20260829-0003"));
    }
}
