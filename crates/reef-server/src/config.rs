//! Server configuration.

use reef_settings::ServerSettings;
use serde::{Deserialize, Serialize};

/// Configuration for the reefwatch server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Heartbeat probe interval in seconds.
    pub heartbeat_interval_secs: u64,
    /// Connection idle timeout in seconds.
    pub heartbeat_timeout_secs: u64,
    /// Outbound frame channel capacity per connection.
    pub send_queue_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            heartbeat_interval_secs: 15,
            heartbeat_timeout_secs: 30,
            send_queue_capacity: 1024,
        }
    }
}

impl From<&ServerSettings> for ServerConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            heartbeat_interval_secs: settings.heartbeat_interval_secs,
            heartbeat_timeout_secs: settings.heartbeat_timeout_secs,
            send_queue_capacity: settings.send_queue_capacity,
        }
    }
}
