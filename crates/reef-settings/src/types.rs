//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the dashboard
//! JSON format. Each type implements [`Default`] with production default
//! values; `#[serde(default)]` allows partial JSON — missing fields get their
//! default value during deserialization.

use serde::{Deserialize, Serialize};

/// Root settings type for the reefwatch backend.
///
/// Loaded from `~/.reefwatch/settings.json` with defaults applied for
/// missing fields. Environment variables can override specific values.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReefSettings {
    /// HTTP/WebSocket server settings.
    pub server: ServerSettings,
    /// Training simulation settings.
    pub training: TrainingSettings,
    /// Live-data feed settings.
    pub feed: FeedSettings,
    /// Model database settings.
    pub database: DatabaseSettings,
}

/// Server network and connection-liveness settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// HTTP/WebSocket port.
    pub port: u16,
    /// Heartbeat probe interval in seconds.
    pub heartbeat_interval_secs: u64,
    /// Connection idle timeout in seconds.
    pub heartbeat_timeout_secs: u64,
    /// Outbound frame channel capacity per connection.
    pub send_queue_capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
            heartbeat_interval_secs: 15,
            heartbeat_timeout_secs: 30,
            send_queue_capacity: 1024,
        }
    }
}

/// Training simulation timing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainingSettings {
    /// Simulated duration of one epoch in milliseconds; each batch tick is
    /// this divided by the batch count.
    pub epoch_duration_ms: u64,
    /// Pause between the validation and training phases in milliseconds.
    pub validation_pause_ms: u64,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            epoch_duration_ms: 3_000,
            validation_pause_ms: 5_000,
        }
    }
}

/// Live-data feed timing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedSettings {
    /// Whether the simulated feed runs at all.
    pub enabled: bool,
    /// Environmental reading broadcast interval in seconds.
    pub environmental_interval_secs: u64,
    /// Vessel position broadcast interval in seconds.
    pub vessel_interval_secs: u64,
    /// System status broadcast interval in seconds.
    pub status_interval_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            environmental_interval_secs: 10,
            vessel_interval_secs: 15,
            status_interval_secs: 60,
        }
    }
}

/// Model database settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Path to the `SQLite` database file (relative to `~/.reefwatch`
    /// unless absolute).
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "models.db".to_string(),
        }
    }
}
