//! Per-job training progress state.

use reef_core::ModelId;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a simulated training run.
///
/// Valid transitions: `initializing → training`, `training ↔ validating`,
/// `training/validating → completed`, any non-terminal `→ failed`
/// (cancellation only — the simulation never fails on its own).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingStatus {
    /// Progress record created, first tick not yet processed.
    Initializing,
    /// Batches are advancing.
    Training,
    /// Between epochs.
    Validating,
    /// All epochs finished; metrics persisted.
    Completed,
    /// Cancelled before completion.
    Failed,
}

impl TrainingStatus {
    /// Whether this status ends the job.
    ///
    /// Both `completed` and `failed` are terminal: a terminal job leaves the
    /// active set and emits no further events.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Mutable state of one simulated training run.
///
/// Owned by the controller and driven by exactly one simulator task; shared
/// as `Arc<Mutex<TrainingProgress>>`, never copied between them.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingProgress {
    /// Job ID (= model record ID).
    pub model_id: ModelId,
    /// Completed epochs.
    pub epoch: u32,
    /// Configured epoch count.
    pub total_epochs: u32,
    /// Batches completed within the current epoch.
    pub batch: u32,
    /// Batches per epoch.
    pub total_batches: u32,
    /// Current training loss.
    pub loss: f64,
    /// Current training accuracy.
    pub accuracy: f64,
    /// Current validation loss.
    pub validation_loss: f64,
    /// Current validation accuracy.
    pub validation_accuracy: f64,
    /// Configured learning rate.
    pub learning_rate: f64,
    /// Estimated seconds until completion.
    pub eta_seconds: u64,
    /// Lifecycle status.
    pub status: TrainingStatus,
}

impl TrainingProgress {
    /// Seed the progress record for a new job (epoch 0, batch 0,
    /// `initializing`).
    #[must_use]
    pub fn seed(model_id: ModelId, total_epochs: u32, total_batches: u32, learning_rate: f64) -> Self {
        Self {
            model_id,
            epoch: 0,
            total_epochs,
            batch: 0,
            total_batches,
            loss: 0.0,
            accuracy: 0.0,
            validation_loss: 0.0,
            validation_accuracy: 0.0,
            learning_rate,
            eta_seconds: 0,
            status: TrainingStatus::Initializing,
        }
    }

    /// Fractional progress through the whole run, in [0, 1].
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total_epochs == 0 || self.total_batches == 0 {
            return 0.0;
        }
        (f64::from(self.epoch) + f64::from(self.batch) / f64::from(self.total_batches))
            / f64::from(self.total_epochs)
    }

    /// Batches left across all remaining epochs.
    #[must_use]
    pub fn remaining_batches(&self) -> u64 {
        let total = u64::from(self.total_epochs) * u64::from(self.total_batches);
        let done = u64::from(self.epoch) * u64::from(self.total_batches) + u64::from(self.batch);
        total.saturating_sub(done)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
