//! Test doubles shared across the workspace's test suites.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use reef_core::{DashboardEventType, EventSink};

/// One event captured by [`RecordingSink`].
#[derive(Clone, Debug)]
pub struct RecordedEvent {
    /// Event type tag.
    pub event_type: DashboardEventType,
    /// Payload.
    pub data: Value,
    /// Topic the event was published under.
    pub topic: Option<String>,
}

/// An [`EventSink`] that records every emitted event in order.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// Number of events recorded.
    #[must_use]
    pub fn count(&self) -> usize {
        self.events.lock().len()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit(&self, event_type: DashboardEventType, data: Value, topic: Option<&str>) {
        self.events.lock().push(RecordedEvent {
            event_type,
            data,
            topic: topic.map(ToOwned::to_owned),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn records_in_order() {
        let sink = RecordingSink::new();
        sink.emit(DashboardEventType::Alert, json!({"n": 1}), Some("alerts"))
            .await;
        sink.emit(DashboardEventType::Pong, json!({"n": 2}), None).await;

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, DashboardEventType::Alert);
        assert_eq!(events[0].topic.as_deref(), Some("alerts"));
        assert_eq!(events[1].data["n"], 2);
        assert!(events[1].topic.is_none());
    }
}
