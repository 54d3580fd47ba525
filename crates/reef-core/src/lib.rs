//! # reef-core
//!
//! Shared vocabulary for the reefwatch dashboard backend.
//!
//! - Branded ID newtypes ([`ids::ConnectionId`], [`ids::ModelId`])
//! - The WebSocket wire envelope and event-type enum ([`events`])
//! - Model-type variants with lenient parsing ([`model_type::ModelType`])
//! - Tracing subscriber initialization ([`logging::init_subscriber`])

#![deny(unsafe_code)]

pub mod events;
pub mod ids;
pub mod logging;
pub mod model_type;

pub use events::{DashboardEventType, EventEnvelope, EventSink};
pub use ids::{ConnectionId, ModelId};
pub use model_type::ModelType;
