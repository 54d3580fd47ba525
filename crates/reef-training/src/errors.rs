//! Error types for the training subsystem.

use thiserror::Error;

/// Errors returned by the training controller.
#[derive(Debug, Error)]
pub enum TrainingError {
    /// Model store failure.
    #[error("store error: {0}")]
    Store(#[from] reef_store::StoreError),

    /// No model record exists for the requested ID.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// A training run configuration value was rejected.
    #[error("invalid training config: {0}")]
    InvalidConfig(String),
}

/// Convenience type alias for training results.
pub type Result<T> = std::result::Result<T, TrainingError>;
