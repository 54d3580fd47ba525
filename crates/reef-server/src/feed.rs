//! Simulated live-data feed.
//!
//! One background task broadcasts environmental readings, vessel positions,
//! and periodic status updates on their own topics. Readings that cross an
//! alert threshold additionally raise an `alert` broadcast on the `alerts`
//! topic. Runs until cancelled.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::info;

use reef_core::events::topics;
use reef_core::DashboardEventType;
use reef_settings::FeedSettings;
use reef_training::TrainingController;

use crate::live_data;
use crate::websocket::broadcast::BroadcastHub;
use crate::websocket::registry::ConnectionRegistry;

/// Broadcast intervals for the feed task.
#[derive(Clone, Copy, Debug)]
pub struct FeedTiming {
    /// Environmental reading interval.
    pub environmental: Duration,
    /// Vessel position interval.
    pub vessel: Duration,
    /// System status interval.
    pub status: Duration,
}

impl Default for FeedTiming {
    fn default() -> Self {
        Self {
            environmental: Duration::from_secs(10),
            vessel: Duration::from_secs(15),
            status: Duration::from_secs(60),
        }
    }
}

impl From<&FeedSettings> for FeedTiming {
    fn from(settings: &FeedSettings) -> Self {
        Self {
            environmental: Duration::from_secs(settings.environmental_interval_secs),
            vessel: Duration::from_secs(settings.vessel_interval_secs),
            status: Duration::from_secs(settings.status_interval_secs),
        }
    }
}

/// Run the live-data feed until cancelled.
pub async fn run_feed(
    hub: Arc<BroadcastHub>,
    registry: Arc<ConnectionRegistry>,
    controller: Arc<TrainingController>,
    timing: FeedTiming,
    cancel: CancellationToken,
) {
    info!(?timing, "live-data feed started");
    let mut rng = StdRng::from_os_rng();
    let mut environmental = time::interval(timing.environmental);
    let mut vessel = time::interval(timing.vessel);
    let mut status = time::interval(timing.status);
    // Consume the immediate first ticks
    let _ = environmental.tick().await;
    let _ = vessel.tick().await;
    let _ = status.tick().await;

    loop {
        tokio::select! {
            _ = environmental.tick() => {
                let reading = live_data::environmental_reading(&mut rng);
                let alert = live_data::threshold_alert(&reading);
                let _ = hub
                    .broadcast(
                        DashboardEventType::EnvironmentalData,
                        reading,
                        Some(topics::ENVIRONMENTAL),
                    )
                    .await;
                if let Some(alert) = alert {
                    let _ = hub
                        .broadcast(DashboardEventType::Alert, alert, Some(topics::ALERTS))
                        .await;
                }
            }
            _ = vessel.tick() => {
                let _ = hub
                    .broadcast(
                        DashboardEventType::VesselUpdate,
                        live_data::vessel_position(&mut rng),
                        Some(topics::VESSELS),
                    )
                    .await;
            }
            _ = status.tick() => {
                let payload = live_data::system_status(
                    registry.count().await,
                    controller.active_jobs().await.len(),
                );
                let _ = hub
                    .broadcast(DashboardEventType::SystemStatus, payload, Some(topics::SYSTEM))
                    .await;
            }
            () = cancel.cancelled() => {
                info!("live-data feed stopped");
                return;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
