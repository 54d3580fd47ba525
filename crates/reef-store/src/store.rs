//! [`ModelStore`] — the pooled store facade the rest of the system consumes.

use reef_core::ModelId;

use crate::connection::ConnectionPool;
use crate::errors::Result;
use crate::models::{ModelMetricsUpdate, ModelRecord, ModelStatus, NewModel};
use crate::repository::ModelRepo;

/// Model store over a pooled `SQLite` database.
///
/// Cheap to clone behind an `Arc`; every method checks out a pooled
/// connection for the duration of the call.
pub struct ModelStore {
    pool: ConnectionPool,
}

impl ModelStore {
    /// Create a store over an existing pool (migrations already run).
    #[must_use]
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Create a model record in `pending` state, assigning a fresh ID.
    pub fn create_model(&self, new: &NewModel) -> Result<ModelRecord> {
        let conn = self.pool.get()?;
        ModelRepo::create(&conn, new)
    }

    /// Fetch a model record by ID.
    pub fn get_model(&self, id: &ModelId) -> Result<Option<ModelRecord>> {
        let conn = self.pool.get()?;
        ModelRepo::get(&conn, id)
    }

    /// List all model records, newest first.
    pub fn list_models(&self) -> Result<Vec<ModelRecord>> {
        let conn = self.pool.get()?;
        ModelRepo::list(&conn)
    }

    /// Update a model's lifecycle status.
    ///
    /// # Errors
    ///
    /// [`crate::StoreError::ModelNotFound`] if the ID is unknown.
    pub fn set_status(&self, id: &ModelId, status: ModelStatus) -> Result<()> {
        let conn = self.pool.get()?;
        ModelRepo::set_status(&conn, id, status)
    }

    /// Persist final summary metrics and mark the model `ready`.
    ///
    /// # Errors
    ///
    /// [`crate::StoreError::ModelNotFound`] if the ID is unknown.
    pub fn finalize_metrics(&self, id: &ModelId, metrics: &ModelMetricsUpdate) -> Result<()> {
        let conn = self.pool.get()?;
        ModelRepo::finalize_metrics(&conn, id, metrics)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
