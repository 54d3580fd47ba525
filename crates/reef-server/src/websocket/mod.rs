//! WebSocket gateway: connection state, registry, fan-out, liveness, dispatch.

pub mod broadcast;
pub mod connection;
pub mod handler;
pub mod heartbeat;
pub mod registry;
pub mod session;
