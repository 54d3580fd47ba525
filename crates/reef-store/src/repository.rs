//! Model repository — stateless, every method takes `&Connection`.

use rusqlite::{params, Connection, OptionalExtension, Row};

use reef_core::ModelId;

use crate::errors::{Result, StoreError};
use crate::models::{ModelMetricsUpdate, ModelRecord, ModelStatus, NewModel};

pub struct ModelRepo;

const SELECT_COLUMNS: &str = "id, name, model_type, architecture, epochs, batch_size, \
     learning_rate, dataset_size, status, accuracy, precision_score, recall_score, \
     f1_score, is_active, created_at, updated_at";

impl ModelRepo {
    /// Insert a new model record in `pending` state and return it.
    pub fn create(conn: &Connection, new: &NewModel) -> Result<ModelRecord> {
        let id = ModelId::new();
        let now = chrono::Utc::now().to_rfc3339();
        let _ = conn.execute(
            "INSERT INTO models (id, name, model_type, architecture, epochs, batch_size,
                                 learning_rate, dataset_size, status, is_active,
                                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10, ?10)",
            params![
                id.as_str(),
                new.name,
                new.model_type.as_str(),
                new.architecture,
                new.epochs,
                new.batch_size,
                new.learning_rate,
                new.dataset_size,
                ModelStatus::Pending.as_sql(),
                now,
            ],
        )?;
        Self::get(conn, &id)?.ok_or_else(|| StoreError::ModelNotFound(id.to_string()))
    }

    /// Fetch a model record by ID.
    pub fn get(conn: &Connection, id: &ModelId) -> Result<Option<ModelRecord>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM models WHERE id = ?1");
        let record = conn
            .query_row(&sql, params![id.as_str()], map_record)
            .optional()?;
        Ok(record)
    }

    /// List all model records, newest first.
    pub fn list(conn: &Connection) -> Result<Vec<ModelRecord>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM models ORDER BY created_at DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_record)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Update a model's lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ModelNotFound`] if the ID is unknown.
    pub fn set_status(conn: &Connection, id: &ModelId, status: ModelStatus) -> Result<()> {
        let changed = conn.execute(
            "UPDATE models SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                status.as_sql(),
                chrono::Utc::now().to_rfc3339(),
                id.as_str()
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::ModelNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Write final summary metrics and mark the model `ready`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ModelNotFound`] if the ID is unknown.
    pub fn finalize_metrics(
        conn: &Connection,
        id: &ModelId,
        metrics: &ModelMetricsUpdate,
    ) -> Result<()> {
        let changed = conn.execute(
            "UPDATE models
             SET status = ?1, accuracy = ?2, precision_score = ?3, recall_score = ?4,
                 f1_score = ?5, is_active = ?6, updated_at = ?7
             WHERE id = ?8",
            params![
                ModelStatus::Ready.as_sql(),
                metrics.accuracy,
                metrics.precision,
                metrics.recall,
                metrics.f1_score,
                metrics.is_active,
                chrono::Utc::now().to_rfc3339(),
                id.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::ModelNotFound(id.to_string()));
        }
        Ok(())
    }
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<ModelRecord> {
    let status_text: String = row.get(8)?;
    Ok(ModelRecord {
        id: ModelId::from_string(row.get(0)?),
        name: row.get(1)?,
        model_type: row.get(2)?,
        architecture: row.get(3)?,
        epochs: row.get(4)?,
        batch_size: row.get(5)?,
        learning_rate: row.get(6)?,
        dataset_size: row.get(7)?,
        status: ModelStatus::from_sql(&status_text).unwrap_or(ModelStatus::Pending),
        accuracy: row.get(9)?,
        precision: row.get(10)?,
        recall: row.get(11)?,
        f1_score: row.get(12)?,
        is_active: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
