//! Client message dispatch.
//!
//! Incoming text frames parse into [`ClientMessage`]; malformed JSON or
//! unknown message types are logged and dropped with nothing echoed back —
//! the connection stays open.

use serde::Deserialize;
use tracing::{debug, warn};

use reef_core::{ConnectionId, DashboardEventType};

use super::broadcast::{BroadcastHub, PartialEvent};
use super::registry::ConnectionRegistry;
use crate::live_data;

/// Client → server control messages, selected by the `type` field.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Add topics to this connection's subscription set.
    Subscribe {
        /// Topics to add.
        channels: Vec<String>,
    },
    /// Remove topics from this connection's subscription set.
    Unsubscribe {
        /// Topics to remove.
        channels: Vec<String>,
    },
    /// Liveness signal; answered with a `pong` event.
    Ping,
    /// Request a one-off data sample.
    RequestData {
        /// What to sample.
        data: DataRequest,
    },
}

/// Payload of a `request_data` message, selected by its own `type` field.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataRequest {
    /// Latest environmental readings.
    EnvironmentalLatest,
    /// Current vessel position.
    VesselPosition,
}

/// Handle one incoming text frame from a connection.
pub async fn handle_message(
    text: &str,
    conn_id: &ConnectionId,
    registry: &ConnectionRegistry,
    hub: &BroadcastHub,
) {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            warn!(conn_id = %conn_id, error = %e, "malformed client message dropped");
            return;
        }
    };

    match message {
        ClientMessage::Subscribe { channels } => {
            debug!(conn_id = %conn_id, ?channels, "subscribe");
            registry.subscribe(conn_id, &channels).await;
        }
        ClientMessage::Unsubscribe { channels } => {
            debug!(conn_id = %conn_id, ?channels, "unsubscribe");
            registry.unsubscribe(conn_id, &channels).await;
        }
        ClientMessage::Ping => {
            registry.touch(conn_id).await;
            let _ = hub
                .send_to(
                    conn_id,
                    PartialEvent::new(DashboardEventType::Pong, serde_json::json!({})),
                )
                .await;
        }
        ClientMessage::RequestData { data } => {
            let (event_type, payload) = {
                let mut rng = rand::rng();
                match data {
                    DataRequest::EnvironmentalLatest => (
                        DashboardEventType::EnvironmentalData,
                        live_data::environmental_reading(&mut rng),
                    ),
                    DataRequest::VesselPosition => (
                        DashboardEventType::VesselUpdate,
                        live_data::vessel_position(&mut rng),
                    ),
                }
            };
            if !hub
                .send_to(conn_id, PartialEvent::new(event_type, payload))
                .await
            {
                debug!(conn_id = %conn_id, "failed to answer data request");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
