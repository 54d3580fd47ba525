//! # reef-server
//!
//! Axum HTTP + `WebSocket` gateway for the reefwatch dashboard.
//!
//! - `WebSocket` gateway: connection registry with per-connection topic
//!   subscriptions, heartbeat liveness eviction, message dispatch
//! - Topic-filtered event fan-out ([`websocket::broadcast::BroadcastHub`])
//! - Simulated live-data feed (environmental readings, vessel positions,
//!   threshold alerts)
//! - REST API over the model store and training controller
//! - `/health` and Prometheus `/metrics` endpoints
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod feed;
pub mod health;
pub mod live_data;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use server::{AppState, ReefServer};
pub use shutdown::ShutdownCoordinator;
