//! Error types for the model store.

use thiserror::Error;

/// Errors that can occur during model store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Describes which migration failed and why.
        message: String,
    },

    /// Requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),
}

/// Convenience type alias for model store results.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_error_display() {
        let err = StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows);
        assert!(err.to_string().contains("sqlite error"));
    }

    #[test]
    fn migration_error_display() {
        let err = StoreError::Migration {
            message: "v001 failed".into(),
        };
        assert_eq!(err.to_string(), "migration error: v001 failed");
    }

    #[test]
    fn model_not_found_display() {
        let err = StoreError::ModelNotFound("mdl-123".into());
        assert_eq!(err.to_string(), "model not found: mdl-123");
    }
}
