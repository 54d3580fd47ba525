//! Heartbeat liveness monitoring — one sweep task over the whole registry.
//!
//! Each tick walks a snapshot of the registry: connections whose channel is
//! closed are removed, connections idle past the timeout are terminated and
//! removed, and everything else gets a ping probe enqueued without waiting.
//! The pong reply (or any client-level ping) refreshes liveness through the
//! registry, so a dead connection is caught on a later sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::connection::OutboundFrame;
use super::registry::ConnectionRegistry;

/// Counters from one heartbeat sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Connections removed because their channel was closed.
    pub closed: usize,
    /// Connections removed because they were idle past the timeout.
    pub timed_out: usize,
    /// Ping probes enqueued.
    pub probed: usize,
}

/// Walk every connection once: evict the closed and the idle, probe the rest.
///
/// Probing is `try_send` and never waits for a reply, so one dead or slow
/// connection cannot stall the sweep.
pub async fn sweep(registry: &ConnectionRegistry, timeout: Duration) -> SweepStats {
    let mut stats = SweepStats::default();

    for connection in registry.snapshot().await {
        if !connection.is_open() {
            debug!(conn_id = %connection.id, "removing closed connection");
            registry.unregister(&connection.id).await;
            stats.closed += 1;
            continue;
        }
        let idle = connection.idle_time();
        if idle > timeout {
            warn!(conn_id = %connection.id, ?idle, "connection timed out, terminating");
            metrics::counter!(crate::metrics::WS_HEARTBEAT_EVICTIONS_TOTAL).increment(1);
            connection.close();
            registry.unregister(&connection.id).await;
            stats.timed_out += 1;
            continue;
        }
        let _ = connection.send_frame(OutboundFrame::Ping);
        stats.probed += 1;
    }
    stats
}

/// Run the heartbeat monitor until cancelled.
pub async fn run_heartbeat(
    registry: Arc<ConnectionRegistry>,
    interval: Duration,
    timeout: Duration,
    cancel: CancellationToken,
) {
    info!(?interval, ?timeout, "heartbeat monitor started");
    let mut tick = time::interval(interval);
    // Consume the immediate first tick
    let _ = tick.tick().await;

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let stats = sweep(&registry, timeout).await;
                if stats.closed > 0 || stats.timed_out > 0 {
                    info!(
                        closed = stats.closed,
                        timed_out = stats.timed_out,
                        probed = stats.probed,
                        "heartbeat sweep evicted connections"
                    );
                }
            }
            () = cancel.cancelled() => {
                info!("heartbeat monitor stopped");
                return;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
