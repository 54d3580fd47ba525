//! WebSocket wire events.
//!
//! [`DashboardEventType`] enumerates every event type pushed to connected
//! clients, [`EventEnvelope`] wraps a payload with its type tag and an
//! emission timestamp, and [`EventSink`] is the seam through which producers
//! (the training simulator, the live-data feed) publish without depending on
//! the server crate.
//!
//! These types match the dashboard's JSON wire format exactly — the web UI
//! depends on the string values.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Subscription topics with reserved meaning.
pub mod topics {
    /// Wildcard topic — a subscriber to `"all"` receives every broadcast.
    pub const ALL: &str = "all";
    /// Training progress events.
    pub const TRAINING: &str = "training";
    /// Environmental sensor readings.
    pub const ENVIRONMENTAL: &str = "environmental";
    /// Research vessel position updates.
    pub const VESSELS: &str = "vessels";
    /// Threshold alerts.
    pub const ALERTS: &str = "alerts";
    /// Backend status broadcasts.
    pub const SYSTEM: &str = "system";
    /// Species-identification predictions.
    pub const PREDICTIONS: &str = "predictions";
}

/// Event types broadcast to WebSocket clients.
///
/// Each variant serializes to the snake_case string the dashboard UI keys
/// its handlers on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DashboardEventType {
    /// Welcome event carrying the client's connection ID.
    #[serde(rename = "connection")]
    Connection,
    /// Acknowledges a subscribe request with the full current topic set.
    #[serde(rename = "subscription_confirmed")]
    SubscriptionConfirmed,
    /// Reply to a client-level ping message.
    #[serde(rename = "pong")]
    Pong,
    /// Latest environmental sensor readings.
    #[serde(rename = "environmental_data")]
    EnvironmentalData,
    /// Research vessel position update.
    #[serde(rename = "vessel_update")]
    VesselUpdate,
    /// Training job progress tick.
    #[serde(rename = "training_update")]
    TrainingUpdate,
    /// Training job finished and its model record was finalized.
    #[serde(rename = "training_complete")]
    TrainingComplete,
    /// Threshold alert.
    #[serde(rename = "alert")]
    Alert,
    /// Backend status broadcast.
    #[serde(rename = "system_status")]
    SystemStatus,
    /// Species-identification prediction.
    #[serde(rename = "prediction")]
    Prediction,
    /// Fallback type for unicast events sent without an explicit type.
    #[serde(rename = "unknown")]
    Unknown,
}

impl DashboardEventType {
    /// The wire string for this event type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::SubscriptionConfirmed => "subscription_confirmed",
            Self::Pong => "pong",
            Self::EnvironmentalData => "environmental_data",
            Self::VesselUpdate => "vessel_update",
            Self::TrainingUpdate => "training_update",
            Self::TrainingComplete => "training_complete",
            Self::Alert => "alert",
            Self::SystemStatus => "system_status",
            Self::Prediction => "prediction",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DashboardEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashboardEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(Value::String(s.to_owned()))
            .map_err(|_| format!("unknown event type: {s}"))
    }
}

/// Server → client event envelope: `{type, data, timestamp}`.
///
/// The timestamp is assigned when the envelope is built — i.e. at emission
/// time, not at creation of the underlying data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Event type tag.
    #[serde(rename = "type")]
    pub event_type: DashboardEventType,
    /// Opaque structured payload.
    pub data: Value,
    /// RFC 3339 UTC emission timestamp.
    pub timestamp: String,
}

impl EventEnvelope {
    /// Build an envelope stamped with the current time.
    #[must_use]
    pub fn new(event_type: DashboardEventType, data: Value) -> Self {
        Self {
            event_type,
            data,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Serialize to the wire JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Publishing seam for event producers.
///
/// The broadcast hub implements this; producers hold an `Arc<dyn EventSink>`
/// and never see connection state. A `topic` of `None` reaches every
/// connection; `Some(topic)` reaches subscribers of that topic and of the
/// [`topics::ALL`] wildcard.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publish one event.
    async fn emit(&self, event_type: DashboardEventType, data: Value, topic: Option<&str>);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
