//! # reef-store
//!
//! `SQLite` persistence for model records.
//!
//! - `r2d2` connection pool with WAL mode and foreign keys enabled
//! - Versioned schema migrations tracked in `schema_version`
//! - [`ModelStore`] — the narrow create/update/get surface the training
//!   subsystem consumes

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod models;
mod repository;
pub mod store;

pub use connection::{new_file, new_in_memory, ConnectionConfig, ConnectionPool};
pub use errors::{Result, StoreError};
pub use migrations::run_migrations;
pub use models::{ModelMetricsUpdate, ModelRecord, ModelStatus, NewModel};
pub use store::ModelStore;
