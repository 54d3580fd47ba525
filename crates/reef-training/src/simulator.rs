//! The periodic simulation task driving one training job.
//!
//! State machine: `initializing → training → (validating → training)* →
//! completed`, with any non-terminal state `→ failed` on cancellation. Each
//! batch tick recomputes the metric curves and publishes a `training_update`
//! on the `training` topic; the terminal event for a job is always the last
//! one emitted for its ID.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::Rng;
use serde_json::json;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use reef_core::events::topics;
use reef_core::{DashboardEventType, EventSink, ModelType};
use reef_store::{ModelMetricsUpdate, ModelStore};

use crate::curves;
use crate::progress::{TrainingProgress, TrainingStatus};

/// Timing knobs for the simulation.
#[derive(Clone, Copy, Debug)]
pub struct SimulatorTiming {
    /// Simulated wall-clock duration of one epoch.
    pub epoch_duration: Duration,
    /// Pause between the validating and training phases.
    pub validation_pause: Duration,
}

impl Default for SimulatorTiming {
    fn default() -> Self {
        Self {
            epoch_duration: Duration::from_secs(3),
            validation_pause: Duration::from_secs(5),
        }
    }
}

impl SimulatorTiming {
    /// The tick period for one batch: epoch duration / batches per epoch.
    #[must_use]
    pub fn batch_tick(&self, total_batches: u32) -> Duration {
        self.epoch_duration / total_batches.max(1)
    }
}

/// How a simulation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationOutcome {
    /// All epochs ran and the model record was finalized.
    Completed,
    /// The job was cancelled before finishing.
    Cancelled,
}

/// Drive one training job to a terminal state.
///
/// Runs until every epoch has finished (finalizing the model record and
/// emitting `training_complete`) or until `cancel` fires (marking the job
/// `failed` and emitting a final `training_update`).
#[allow(clippy::too_many_lines)]
pub async fn run_simulation(
    progress: Arc<Mutex<TrainingProgress>>,
    model_type: ModelType,
    timing: SimulatorTiming,
    sink: Arc<dyn EventSink>,
    store: Arc<ModelStore>,
    cancel: CancellationToken,
    mut rng: StdRng,
) -> SimulationOutcome {
    let (model_id, total_epochs, total_batches) = {
        let mut p = progress.lock();
        p.status = TrainingStatus::Training;
        (p.model_id.clone(), p.total_epochs, p.total_batches)
    };
    let tick_period = timing.batch_tick(total_batches);
    let batch_secs = tick_period.as_secs_f64();

    info!(
        model_id = %model_id,
        total_epochs,
        total_batches,
        ?tick_period,
        "training simulation started"
    );
    emit_progress(&sink, &progress).await;

    let mut interval = time::interval(tick_period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Consume the immediate first tick
    let _ = interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            () = cancel.cancelled() => {
                return finish_cancelled(&sink, &progress, &model_id).await;
            }
        }

        let epoch_finished = {
            let mut p = progress.lock();
            p.batch += 1;
            let fraction = p.fraction();
            p.loss = curves::loss(fraction, model_type, &mut rng);
            p.accuracy = curves::accuracy(fraction, model_type, &mut rng);
            p.validation_loss = p.loss + rng.random_range(0.0..0.1);
            p.validation_accuracy = (p.accuracy - rng.random_range(0.0..0.05)).max(0.0);
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_precision_loss
            )]
            {
                p.eta_seconds = (p.remaining_batches() as f64 * batch_secs).round() as u64;
            }
            p.batch >= p.total_batches
        };
        emit_progress(&sink, &progress).await;

        if !epoch_finished {
            continue;
        }

        let run_finished = {
            let mut p = progress.lock();
            p.epoch += 1;
            p.batch = 0;
            p.epoch >= total_epochs
        };

        if run_finished {
            let final_accuracy = {
                let mut p = progress.lock();
                p.status = TrainingStatus::Completed;
                p.eta_seconds = 0;
                p.accuracy
            };
            let metrics = curves::finalize(final_accuracy, &mut rng);
            if let Err(e) = store.finalize_metrics(
                &model_id,
                &ModelMetricsUpdate {
                    accuracy: metrics.accuracy,
                    precision: metrics.precision,
                    recall: metrics.recall,
                    f1_score: metrics.f1_score,
                    is_active: true,
                },
            ) {
                warn!(model_id = %model_id, error = %e, "failed to finalize model record");
            }
            info!(model_id = %model_id, accuracy = metrics.accuracy, "training simulation completed");
            sink.emit(
                DashboardEventType::TrainingComplete,
                json!({
                    "modelId": model_id,
                    "status": TrainingStatus::Completed,
                    "metrics": {
                        "accuracy": metrics.accuracy,
                        "precision": metrics.precision,
                        "recall": metrics.recall,
                        "f1Score": metrics.f1_score,
                    },
                }),
                Some(topics::TRAINING),
            )
            .await;
            return SimulationOutcome::Completed;
        }

        // Epoch boundary: validate, settle, then resume training.
        {
            let mut p = progress.lock();
            p.status = TrainingStatus::Validating;
        }
        debug!(model_id = %model_id, "epoch finished, validating");
        emit_progress(&sink, &progress).await;

        tokio::select! {
            () = time::sleep(timing.validation_pause) => {}
            () = cancel.cancelled() => {
                return finish_cancelled(&sink, &progress, &model_id).await;
            }
        }

        {
            let mut p = progress.lock();
            p.status = TrainingStatus::Training;
        }
        emit_progress(&sink, &progress).await;
    }
}

async fn emit_progress(sink: &Arc<dyn EventSink>, progress: &Arc<Mutex<TrainingProgress>>) {
    let snapshot = progress.lock().clone();
    match serde_json::to_value(&snapshot) {
        Ok(data) => {
            sink.emit(DashboardEventType::TrainingUpdate, data, Some(topics::TRAINING))
                .await;
        }
        Err(e) => warn!(error = %e, "failed to serialize training progress"),
    }
}

async fn finish_cancelled(
    sink: &Arc<dyn EventSink>,
    progress: &Arc<Mutex<TrainingProgress>>,
    model_id: &reef_core::ModelId,
) -> SimulationOutcome {
    {
        let mut p = progress.lock();
        p.status = TrainingStatus::Failed;
    }
    info!(model_id = %model_id, "training simulation cancelled");
    emit_progress(sink, progress).await;
    SimulationOutcome::Cancelled
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use reef_core::ModelId;
    use reef_store::{ConnectionConfig, NewModel};

    use crate::test_support::RecordingSink;

    fn test_store() -> Arc<ModelStore> {
        let pool = reef_store::new_in_memory(&ConnectionConfig::default()).unwrap();
        {
            let conn = pool.get().unwrap();
            let _ = reef_store::run_migrations(&conn).unwrap();
        }
        Arc::new(ModelStore::new(pool))
    }

    fn fast_timing() -> SimulatorTiming {
        SimulatorTiming {
            epoch_duration: Duration::from_millis(50),
            validation_pause: Duration::from_millis(10),
        }
    }

    fn create_record(store: &ModelStore, epochs: u32) -> ModelId {
        store
            .create_model(&NewModel {
                name: "sim-test".into(),
                model_type: ModelType::Cnn,
                architecture: "resnet".into(),
                epochs,
                batch_size: 2,
                learning_rate: 0.01,
                dataset_size: 10,
            })
            .unwrap()
            .id
    }

    async fn run_to_end(
        epochs: u32,
        batches: u32,
        cancel_after: Option<usize>,
    ) -> (Arc<RecordingSink>, SimulationOutcome, Arc<Mutex<TrainingProgress>>) {
        let store = test_store();
        let id = create_record(&store, epochs);
        let progress = Arc::new(Mutex::new(TrainingProgress::seed(
            id.clone(),
            epochs,
            batches,
            0.01,
        )));
        let sink = Arc::new(RecordingSink::new());
        let cancel = CancellationToken::new();

        if let Some(after_ms) = cancel_after {
            let cancel2 = cancel.clone();
            let _ = tokio::spawn(async move {
                time::sleep(Duration::from_millis(after_ms as u64)).await;
                cancel2.cancel();
            });
        }

        let outcome = run_simulation(
            progress.clone(),
            ModelType::Cnn,
            fast_timing(),
            sink.clone() as Arc<dyn EventSink>,
            store,
            cancel,
            StdRng::seed_from_u64(7),
        )
        .await;
        (sink, outcome, progress)
    }

    fn pairs(sink: &RecordingSink) -> Vec<(u64, u64)> {
        sink.events()
            .iter()
            .filter(|e| e.event_type == DashboardEventType::TrainingUpdate)
            .map(|e| {
                (
                    e.data["epoch"].as_u64().unwrap(),
                    e.data["batch"].as_u64().unwrap(),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn emits_monotonic_epoch_batch_pairs_and_completes() {
        let (sink, outcome, progress) = run_to_end(3, 5, None).await;
        assert_eq!(outcome, SimulationOutcome::Completed);

        let seq = pairs(&sink);
        assert!(seq.windows(2).all(|w| w[0] <= w[1]), "pairs not monotonic: {seq:?}");

        let p = progress.lock();
        assert_eq!(p.status, TrainingStatus::Completed);
        assert_eq!(p.epoch, 3);
        assert_eq!(p.batch, 0);
        assert_eq!(p.eta_seconds, 0);
    }

    #[tokio::test]
    async fn completion_event_is_last() {
        let (sink, _, _) = run_to_end(2, 3, None).await;
        let events = sink.events();
        let last = events.last().unwrap();
        assert_eq!(last.event_type, DashboardEventType::TrainingComplete);
        assert_eq!(last.data["status"], "completed");
        // every metric in [0, 1]
        for key in ["accuracy", "precision", "recall", "f1Score"] {
            let v = last.data["metrics"][key].as_f64().unwrap();
            assert!((0.0..=1.0).contains(&v), "{key} = {v} out of range");
        }
    }

    #[tokio::test]
    async fn first_event_is_training_at_zero() {
        let (sink, _, _) = run_to_end(1, 2, None).await;
        let first = &sink.events()[0];
        assert_eq!(first.event_type, DashboardEventType::TrainingUpdate);
        assert_eq!(first.data["status"], "training");
        assert_eq!(first.data["epoch"], 0);
        assert_eq!(first.data["batch"], 0);
    }

    #[tokio::test]
    async fn single_batch_job_completes_immediately() {
        let (sink, outcome, progress) = run_to_end(1, 1, None).await;
        assert_eq!(outcome, SimulationOutcome::Completed);
        assert_eq!(progress.lock().epoch, 1);
        // never enters validating: one epoch means batch rollover ends the run
        assert!(sink
            .events()
            .iter()
            .all(|e| e.data["status"] != "validating"));
    }

    #[tokio::test]
    async fn validation_phase_emitted_between_epochs() {
        let (sink, _, _) = run_to_end(2, 2, None).await;
        let statuses: Vec<String> = sink
            .events()
            .iter()
            .filter(|e| e.event_type == DashboardEventType::TrainingUpdate)
            .map(|e| e.data["status"].as_str().unwrap().to_owned())
            .collect();
        assert!(statuses.iter().any(|s| s == "validating"));
    }

    #[tokio::test]
    async fn cancellation_emits_failed_last() {
        let (sink, outcome, progress) = run_to_end(50, 10, Some(40)).await;
        assert_eq!(outcome, SimulationOutcome::Cancelled);
        assert_eq!(progress.lock().status, TrainingStatus::Failed);
        let last = sink.events().last().unwrap().clone();
        assert_eq!(last.event_type, DashboardEventType::TrainingUpdate);
        assert_eq!(last.data["status"], "failed");
    }

    #[tokio::test]
    async fn completed_job_finalizes_model_record() {
        let store = test_store();
        let id = create_record(&store, 1);
        let progress = Arc::new(Mutex::new(TrainingProgress::seed(id.clone(), 1, 1, 0.01)));
        let sink = Arc::new(RecordingSink::new());

        let outcome = run_simulation(
            progress,
            ModelType::Cnn,
            fast_timing(),
            sink as Arc<dyn EventSink>,
            store.clone(),
            CancellationToken::new(),
            StdRng::seed_from_u64(1),
        )
        .await;
        assert_eq!(outcome, SimulationOutcome::Completed);

        let record = store.get_model(&id).unwrap().unwrap();
        assert!(record.is_active);
        for v in [record.accuracy, record.precision, record.recall, record.f1_score] {
            let v = v.unwrap();
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn batch_tick_divides_epoch_duration() {
        let timing = SimulatorTiming {
            epoch_duration: Duration::from_secs(3),
            validation_pause: Duration::from_secs(5),
        };
        assert_eq!(timing.batch_tick(10), Duration::from_millis(300));
        // zero batches does not divide by zero
        assert_eq!(timing.batch_tick(0), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn events_carry_training_topic() {
        let (sink, _, _) = run_to_end(1, 2, None).await;
        assert!(sink
            .events()
            .iter()
            .all(|e| e.topic.as_deref() == Some(topics::TRAINING)));
    }
}
