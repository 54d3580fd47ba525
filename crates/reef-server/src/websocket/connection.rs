//! WebSocket client connection state.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use reef_core::events::topics;
use reef_core::{ConnectionId, EventEnvelope};

/// A frame queued for the connection's writer task.
#[derive(Clone, Debug)]
pub enum OutboundFrame {
    /// Pre-serialized event JSON, shared across a fan-out.
    Event(Arc<String>),
    /// Liveness probe; the writer turns it into a protocol ping frame.
    Ping,
}

/// Represents a connected WebSocket client.
pub struct ClientConnection {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Send channel to the client's WebSocket write task.
    tx: mpsc::Sender<OutboundFrame>,
    /// Topics this connection subscribed to.
    subscriptions: Mutex<HashSet<String>>,
    /// When the last liveness signal (ping message or pong frame) arrived.
    last_seen: Mutex<Instant>,
    /// When this connection was established.
    pub connected_at: Instant,
    /// Count of frames dropped due to a full or closed channel.
    pub dropped_frames: AtomicU64,
    /// Cancelled to force the session loops down (heartbeat eviction).
    closed: CancellationToken,
}

impl ClientConnection {
    /// Create a new connection.
    pub fn new(id: ConnectionId, tx: mpsc::Sender<OutboundFrame>) -> Self {
        let now = Instant::now();
        Self {
            id,
            tx,
            subscriptions: Mutex::new(HashSet::new()),
            last_seen: Mutex::new(now),
            connected_at: now,
            dropped_frames: AtomicU64::new(0),
            closed: CancellationToken::new(),
        }
    }

    /// Enqueue a frame for the writer task.
    ///
    /// Returns `false` if the channel is full or closed, and increments
    /// the dropped frame counter.
    pub fn send_frame(&self, frame: OutboundFrame) -> bool {
        if self.tx.try_send(frame).is_ok() {
            true
        } else {
            let _ = self.dropped_frames.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Enqueue pre-serialized event JSON.
    pub fn send_text(&self, text: Arc<String>) -> bool {
        self.send_frame(OutboundFrame::Event(text))
    }

    /// Serialize an envelope and enqueue it.
    pub fn send_event(&self, envelope: &EventEnvelope) -> bool {
        match envelope.to_json() {
            Ok(json) => self.send_text(Arc::new(json)),
            Err(_) => false,
        }
    }

    /// Whether frames can still reach the writer task.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed() && !self.closed.is_cancelled()
    }

    /// Force the session loops down (heartbeat eviction).
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Token the session read loop selects on.
    pub fn close_token(&self) -> CancellationToken {
        self.closed.clone()
    }

    /// Record a liveness signal.
    pub fn touch(&self) {
        *self.last_seen.lock() = Instant::now();
    }

    /// Time since the last liveness signal (or connection establishment).
    pub fn idle_time(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }

    /// Add topics to the subscription set; returns the full set afterwards.
    pub fn subscribe(&self, channels: &[String]) -> Vec<String> {
        let mut subs = self.subscriptions.lock();
        for channel in channels {
            let _ = subs.insert(channel.clone());
        }
        let mut current: Vec<String> = subs.iter().cloned().collect();
        current.sort();
        current
    }

    /// Remove topics from the subscription set.
    pub fn unsubscribe(&self, channels: &[String]) {
        let mut subs = self.subscriptions.lock();
        for channel in channels {
            let _ = subs.remove(channel);
        }
    }

    /// Snapshot of the subscription set.
    pub fn subscriptions(&self) -> HashSet<String> {
        self.subscriptions.lock().clone()
    }

    /// Whether a broadcast on `topic` should reach this connection.
    ///
    /// True when subscribed to the topic itself or to the `"all"` wildcard.
    pub fn wants_topic(&self, topic: &str) -> bool {
        let subs = self.subscriptions.lock();
        subs.contains(topic) || subs.contains(topics::ALL)
    }

    /// Total frames dropped for this connection.
    pub fn drop_count(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
