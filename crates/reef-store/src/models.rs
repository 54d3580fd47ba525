//! Model record types.

use reef_core::{ModelId, ModelType};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a model record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    /// Created, training not started.
    Pending,
    /// A training job is running for this model.
    Training,
    /// Training finished and summary metrics are persisted.
    Ready,
    /// The training job was cancelled.
    Failed,
}

impl ModelStatus {
    /// The TEXT value stored in the `status` column.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Training => "training",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }

    /// Parse the stored TEXT value.
    #[must_use]
    pub fn from_sql(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "training" => Some(Self::Training),
            "ready" => Some(Self::Ready),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A persisted model record.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    /// Record ID (doubles as the training job ID).
    pub id: ModelId,
    /// Human-readable model name.
    pub name: String,
    /// Stored model-type string (`"CNN"`, `"LSTM"`, `"Transformer"`).
    pub model_type: String,
    /// Architecture label (e.g. `"resnet50"`).
    pub architecture: String,
    /// Configured epoch count.
    pub epochs: Option<u32>,
    /// Configured batch size.
    pub batch_size: Option<u32>,
    /// Configured learning rate.
    pub learning_rate: Option<f64>,
    /// Configured dataset size (sample count).
    pub dataset_size: Option<u32>,
    /// Lifecycle status.
    pub status: ModelStatus,
    /// Final accuracy, set on completion.
    pub accuracy: Option<f64>,
    /// Final precision, set on completion.
    pub precision: Option<f64>,
    /// Final recall, set on completion.
    pub recall: Option<f64>,
    /// Final F1 score, set on completion.
    pub f1_score: Option<f64>,
    /// Whether this model serves the identification demo.
    pub is_active: bool,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 last-update timestamp.
    pub updated_at: String,
}

impl ModelRecord {
    /// The stored model type parsed leniently (CNN fallback).
    #[must_use]
    pub fn parsed_model_type(&self) -> ModelType {
        ModelType::parse_lenient(&self.model_type)
    }
}

/// Fields for creating a model record.
#[derive(Clone, Debug)]
pub struct NewModel {
    /// Human-readable model name.
    pub name: String,
    /// Model architecture variant.
    pub model_type: ModelType,
    /// Architecture label.
    pub architecture: String,
    /// Epoch count.
    pub epochs: u32,
    /// Batch size.
    pub batch_size: u32,
    /// Learning rate.
    pub learning_rate: f64,
    /// Dataset size (sample count).
    pub dataset_size: u32,
}

/// Summary metrics written when a training job finalizes.
#[derive(Clone, Copy, Debug)]
pub struct ModelMetricsUpdate {
    /// Final accuracy.
    pub accuracy: f64,
    /// Final precision.
    pub precision: f64,
    /// Final recall.
    pub recall: f64,
    /// Final F1 score.
    pub f1_score: f64,
    /// Whether the model becomes the active one.
    pub is_active: bool,
}
