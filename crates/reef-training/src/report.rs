//! Synthetic metrics reports.
//!
//! The dashboard's metrics view shows a full per-epoch history and a
//! confusion matrix for any model record. The history is regenerated from
//! the curve functions on every request — it is a presentation of what a run
//! with the record's parameters looks like, not a replay of the events that
//! were actually emitted.

use rand::Rng;
use serde::{Deserialize, Serialize};

use reef_core::{ModelId, ModelType};
use reef_store::ModelRecord;

use crate::curves;

/// Epoch count used when a record predates the stored training parameters.
pub const DEFAULT_EPOCHS: u32 = 50;

/// Confusion matrix dimension (identified species classes).
pub const DEFAULT_CLASSES: usize = 10;

/// One row of the synthetic per-epoch history.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochMetrics {
    /// 1-based epoch number.
    pub epoch: u32,
    /// Training loss.
    pub loss: f64,
    /// Training accuracy.
    pub accuracy: f64,
    /// Validation loss.
    pub validation_loss: f64,
    /// Validation accuracy.
    pub validation_accuracy: f64,
}

/// Full synthetic report for one model.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetricsReport {
    /// Model record ID.
    pub model_id: ModelId,
    /// Stored model-type string.
    pub model_type: String,
    /// Per-epoch history, one entry per epoch.
    pub epochs: Vec<EpochMetrics>,
    /// `numClasses × numClasses` counts with a boosted diagonal.
    pub confusion_matrix: Vec<Vec<u64>>,
    /// Persisted final accuracy, if training finished.
    pub accuracy: Option<f64>,
    /// Persisted final precision, if training finished.
    pub precision: Option<f64>,
    /// Persisted final recall, if training finished.
    pub recall: Option<f64>,
    /// Persisted final F1 score, if training finished.
    pub f1_score: Option<f64>,
}

/// Build the synthetic report for a model record.
pub fn build_report(
    record: &ModelRecord,
    num_classes: usize,
    rng: &mut impl Rng,
) -> ModelMetricsReport {
    let model_type = record.parsed_model_type();
    let total_epochs = match record.epochs {
        Some(n) if n > 0 => n,
        _ => DEFAULT_EPOCHS,
    };

    let epochs = (1..=total_epochs)
        .map(|epoch| {
            let progress = f64::from(epoch) / f64::from(total_epochs);
            let loss = curves::loss(progress, model_type, rng);
            let accuracy = curves::accuracy(progress, model_type, rng);
            EpochMetrics {
                epoch,
                loss,
                accuracy,
                validation_loss: loss + rng.random_range(0.0..0.1),
                validation_accuracy: (accuracy - rng.random_range(0.0..0.05)).max(0.0),
            }
        })
        .collect();

    ModelMetricsReport {
        model_id: record.id.clone(),
        model_type: record.model_type.clone(),
        epochs,
        confusion_matrix: confusion_matrix(num_classes, rng),
        accuracy: record.accuracy,
        precision: record.precision,
        recall: record.recall,
        f1_score: record.f1_score,
    }
}

/// Random confusion matrix with diagonal cells boosted to read as a
/// mostly-correct classifier (`cell*5 + uniform(0, 200)`).
fn confusion_matrix(num_classes: usize, rng: &mut impl Rng) -> Vec<Vec<u64>> {
    (0..num_classes)
        .map(|row| {
            (0..num_classes)
                .map(|col| {
                    let cell = rng.random_range(0..50u64);
                    if row == col {
                        cell * 5 + rng.random_range(0..200u64)
                    } else {
                        cell
                    }
                })
                .collect()
        })
        .collect()
}

/// Whether the report covers the same model type as the curves it used.
#[must_use]
pub fn model_type_of(report: &ModelMetricsReport) -> ModelType {
    ModelType::parse_lenient(&report.model_type)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
