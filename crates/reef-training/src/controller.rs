//! Job orchestration keyed by model ID.
//!
//! The controller owns the job map; each entry pairs the shared progress
//! cell with the cancellation token of the simulator task driving it. A job
//! leaves the map when it reaches a terminal state — completed runs remove
//! themselves, cancelled runs are removed by [`TrainingController::stop`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use reef_core::{EventSink, ModelId, ModelType};
use reef_store::{ModelStatus, ModelStore, NewModel};

use crate::errors::{Result, TrainingError};
use crate::progress::TrainingProgress;
use crate::report::{self, ModelMetricsReport};
use crate::simulator::{run_simulation, SimulatorTiming};

/// Configuration for one training run, as submitted by the dashboard.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRunConfig {
    /// Human-readable model name.
    pub name: String,
    /// Model architecture variant.
    #[serde(rename = "type")]
    pub model_type: ModelType,
    /// Architecture label (e.g. `"resnet50"`).
    pub architecture: String,
    /// Epoch count; must be positive.
    pub epochs: u32,
    /// Batch size; must be positive.
    pub batch_size: u32,
    /// Learning rate; must be positive.
    pub learning_rate: f64,
    /// Dataset size in samples; must be positive.
    pub dataset_size: u32,
}

impl TrainingRunConfig {
    fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(TrainingError::InvalidConfig("epochs must be positive".into()));
        }
        if self.batch_size == 0 {
            return Err(TrainingError::InvalidConfig(
                "batchSize must be positive".into(),
            ));
        }
        if self.learning_rate <= 0.0 {
            return Err(TrainingError::InvalidConfig(
                "learningRate must be positive".into(),
            ));
        }
        if self.dataset_size == 0 {
            return Err(TrainingError::InvalidConfig(
                "datasetSize must be positive".into(),
            ));
        }
        Ok(())
    }
}

struct ActiveJob {
    progress: Arc<Mutex<TrainingProgress>>,
    cancel: CancellationToken,
}

/// Orchestrates simulator tasks keyed by job (= model record) ID.
pub struct TrainingController {
    store: Arc<ModelStore>,
    sink: Arc<dyn EventSink>,
    timing: SimulatorTiming,
    jobs: Arc<RwLock<HashMap<ModelId, ActiveJob>>>,
}

impl TrainingController {
    /// Create a controller over the given store and event sink.
    pub fn new(store: Arc<ModelStore>, sink: Arc<dyn EventSink>, timing: SimulatorTiming) -> Self {
        Self {
            store,
            sink,
            timing,
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Start a new training job.
    ///
    /// Creates a pending model record, seeds the progress state with
    /// `ceil(datasetSize / batchSize)` batches per epoch, spawns the
    /// simulator task, and returns the record ID (which is the job ID).
    pub async fn start(&self, config: TrainingRunConfig) -> Result<ModelId> {
        config.validate()?;

        let record = self.store.create_model(&NewModel {
            name: config.name.clone(),
            model_type: config.model_type,
            architecture: config.architecture.clone(),
            epochs: config.epochs,
            batch_size: config.batch_size,
            learning_rate: config.learning_rate,
            dataset_size: config.dataset_size,
        })?;
        let id = record.id.clone();
        self.store.set_status(&id, ModelStatus::Training)?;

        let total_batches = config.dataset_size.div_ceil(config.batch_size);
        let progress = Arc::new(Mutex::new(TrainingProgress::seed(
            id.clone(),
            config.epochs,
            total_batches,
            config.learning_rate,
        )));
        let cancel = CancellationToken::new();

        {
            let mut jobs = self.jobs.write().await;
            let _ = jobs.insert(
                id.clone(),
                ActiveJob {
                    progress: progress.clone(),
                    cancel: cancel.clone(),
                },
            );
        }

        info!(model_id = %id, name = %config.name, model_type = %config.model_type, "training job started");

        let jobs = self.jobs.clone();
        let sink = self.sink.clone();
        let store = self.store.clone();
        let timing = self.timing;
        let task_id = id.clone();
        let _ = tokio::spawn(async move {
            let outcome = run_simulation(
                progress,
                config.model_type,
                timing,
                sink,
                store,
                cancel,
                StdRng::from_os_rng(),
            )
            .await;
            debug!(model_id = %task_id, ?outcome, "training job finished");
            let _ = jobs.write().await.remove(&task_id);
        });

        Ok(id)
    }

    /// Current progress of a job, or `None` once it reached a terminal state.
    pub async fn progress(&self, id: &ModelId) -> Option<TrainingProgress> {
        let jobs = self.jobs.read().await;
        jobs.get(id).map(|job| job.progress.lock().clone())
    }

    /// Snapshots of every job still in a non-terminal state.
    pub async fn active_jobs(&self) -> Vec<TrainingProgress> {
        let jobs = self.jobs.read().await;
        jobs.values()
            .map(|job| job.progress.lock().clone())
            .filter(|p| !p.status.is_terminal())
            .collect()
    }

    /// Number of jobs currently running.
    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Cancel a running job.
    ///
    /// Returns `true` on the first call for a running job and `false` for
    /// unknown or already-finished IDs.
    pub async fn stop(&self, id: &ModelId) -> bool {
        let removed = self.jobs.write().await.remove(id);
        match removed {
            Some(job) => {
                job.cancel.cancel();
                info!(model_id = %id, "training job stop requested");
                true
            }
            None => false,
        }
    }

    /// Regenerate the synthetic metrics report for a model.
    ///
    /// # Errors
    ///
    /// [`TrainingError::ModelNotFound`] when no record exists for the ID.
    pub fn metrics_report(&self, id: &ModelId) -> Result<ModelMetricsReport> {
        let record = self
            .store
            .get_model(id)?
            .ok_or_else(|| TrainingError::ModelNotFound(id.to_string()))?;
        let mut rng = StdRng::from_os_rng();
        Ok(report::build_report(&record, report::DEFAULT_CLASSES, &mut rng))
    }

    /// Cancel every active job (server shutdown).
    pub async fn shutdown(&self) {
        let jobs = std::mem::take(&mut *self.jobs.write().await);
        if !jobs.is_empty() {
            info!(count = jobs.len(), "cancelling active training jobs");
        }
        for job in jobs.values() {
            job.cancel.cancel();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
