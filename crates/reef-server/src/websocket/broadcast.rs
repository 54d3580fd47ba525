//! Topic-filtered event fan-out to connected WebSocket clients.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use reef_core::{ConnectionId, DashboardEventType, EventEnvelope, EventSink};

use super::registry::ConnectionRegistry;

/// A unicast event with optional fields; missing ones get defaults
/// (`unknown` type, empty payload, current timestamp).
#[derive(Clone, Debug, Default)]
pub struct PartialEvent {
    /// Event type; `unknown` when unset.
    pub event_type: Option<DashboardEventType>,
    /// Payload; `{}` when unset.
    pub data: Option<Value>,
}

impl PartialEvent {
    /// A fully-specified unicast event.
    #[must_use]
    pub fn new(event_type: DashboardEventType, data: Value) -> Self {
        Self {
            event_type: Some(event_type),
            data: Some(data),
        }
    }
}

/// Delivers events to registry connections, filtered by topic subscription.
///
/// Filtering is a per-send set-membership test rather than a pre-indexed
/// topic map; connection counts here are dashboard consumers, not public
/// fan-out.
pub struct BroadcastHub {
    registry: Arc<ConnectionRegistry>,
}

impl BroadcastHub {
    /// Create a hub over the given registry.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Broadcast an event, returning the number of successful deliveries.
    ///
    /// With no `topic` every connection receives the event; with a topic,
    /// only subscribers of that topic or of the `"all"` wildcard do. One
    /// failing connection never aborts delivery to the rest, and failures
    /// do not remove the connection here — eviction belongs to the
    /// heartbeat monitor and the session close path.
    pub async fn broadcast(
        &self,
        event_type: DashboardEventType,
        data: Value,
        topic: Option<&str>,
    ) -> usize {
        let envelope = EventEnvelope::new(event_type, data);
        let json = match envelope.to_json() {
            Ok(j) => Arc::new(j),
            Err(e) => {
                warn!(event_type = %event_type, error = %e, "failed to serialize event");
                return 0;
            }
        };

        let connections = self.registry.snapshot().await;
        let mut delivered = 0;
        for connection in &connections {
            if let Some(topic) = topic {
                if !connection.wants_topic(topic) {
                    continue;
                }
            }
            if connection.send_text(json.clone()) {
                delivered += 1;
            } else {
                metrics::counter!(crate::metrics::WS_BROADCAST_DROPS_TOTAL).increment(1);
                warn!(conn_id = %connection.id, event_type = %event_type, "failed to deliver event");
            }
        }
        debug!(event_type = %event_type, ?topic, delivered, "broadcast complete");
        delivered
    }

    /// Direct unicast to one connection.
    ///
    /// Returns `false` when the connection is absent or its channel is
    /// closed.
    pub async fn send_to(&self, id: &ConnectionId, event: PartialEvent) -> bool {
        let Some(connection) = self.registry.get(id).await else {
            return false;
        };
        if !connection.is_open() {
            return false;
        }
        let envelope = EventEnvelope::new(
            event.event_type.unwrap_or(DashboardEventType::Unknown),
            event.data.unwrap_or_else(|| Value::Object(serde_json::Map::new())),
        );
        connection.send_event(&envelope)
    }
}

#[async_trait]
impl EventSink for BroadcastHub {
    async fn emit(&self, event_type: DashboardEventType, data: Value, topic: Option<&str>) {
        let _ = self.broadcast(event_type, data, topic).await;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
