//! Connection registry — live connections, their subscriptions, and liveness.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use reef_core::{ConnectionId, DashboardEventType, EventEnvelope};

use super::connection::{ClientConnection, OutboundFrame};

/// Tracks every live connection from acceptance until close, transport
/// error, or heartbeat eviction.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Arc<ClientConnection>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Accept a connection: assign a fresh ID, store the entry, and send the
    /// welcome event carrying the ID back through the new connection.
    pub async fn register(&self, tx: mpsc::Sender<OutboundFrame>) -> ConnectionId {
        let mut conns = self.connections.write().await;
        let mut id = ConnectionId::new();
        // UUID collisions are not expected; the loop keeps the fresh-ID
        // contract independent of that assumption.
        while conns.contains_key(&id) {
            id = ConnectionId::new();
        }
        let connection = Arc::new(ClientConnection::new(id.clone(), tx));

        let welcome = EventEnvelope::new(
            DashboardEventType::Connection,
            json!({ "clientId": id }),
        );
        if !connection.send_event(&welcome) {
            warn!(conn_id = %id, "failed to send welcome event");
        }

        let _ = conns.insert(id.clone(), connection);
        debug!(conn_id = %id, total = conns.len(), "connection registered");
        id
    }

    /// Remove a connection. Idempotent; absent IDs are a no-op.
    pub async fn unregister(&self, id: &ConnectionId) {
        let mut conns = self.connections.write().await;
        if conns.remove(id).is_some() {
            debug!(conn_id = %id, total = conns.len(), "connection unregistered");
        }
    }

    /// Add topics to a connection's subscription set and confirm with the
    /// full current set. No-op when the connection is absent.
    pub async fn subscribe(&self, id: &ConnectionId, channels: &[String]) {
        let conns = self.connections.read().await;
        let Some(connection) = conns.get(id) else {
            return;
        };
        let current = connection.subscribe(channels);
        debug!(conn_id = %id, channels = ?current, "subscriptions updated");

        let confirmation = EventEnvelope::new(
            DashboardEventType::SubscriptionConfirmed,
            json!({ "channels": current }),
        );
        if !connection.send_event(&confirmation) {
            warn!(conn_id = %id, "failed to send subscription confirmation");
        }
    }

    /// Remove topics from a connection's subscription set. No-op when the
    /// connection is absent or the topics were never subscribed.
    pub async fn unsubscribe(&self, id: &ConnectionId, channels: &[String]) {
        let conns = self.connections.read().await;
        if let Some(connection) = conns.get(id) {
            connection.unsubscribe(channels);
            debug!(conn_id = %id, "subscriptions removed");
        }
    }

    /// Record a liveness signal for a connection.
    pub async fn touch(&self, id: &ConnectionId) {
        let conns = self.connections.read().await;
        if let Some(connection) = conns.get(id) {
            connection.touch();
        }
    }

    /// Number of live connections.
    pub async fn count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// A connection's subscription set (empty when absent).
    pub async fn subscriptions_of(&self, id: &ConnectionId) -> HashSet<String> {
        let conns = self.connections.read().await;
        conns.get(id).map(|c| c.subscriptions()).unwrap_or_default()
    }

    /// Look up one connection.
    pub async fn get(&self, id: &ConnectionId) -> Option<Arc<ClientConnection>> {
        self.connections.read().await.get(id).cloned()
    }

    /// Snapshot of every live connection (heartbeat sweep, fan-out).
    pub async fn snapshot(&self) -> Vec<Arc<ClientConnection>> {
        self.connections.read().await.values().cloned().collect()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (mpsc::Sender<OutboundFrame>, mpsc::Receiver<OutboundFrame>) {
        mpsc::channel(32)
    }

    async fn next_event(rx: &mut mpsc::Receiver<OutboundFrame>) -> serde_json::Value {
        let OutboundFrame::Event(text) = rx.recv().await.unwrap() else {
            panic!("expected event frame");
        };
        serde_json::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn register_sends_welcome_with_client_id() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = channel();
        let id = registry.register(tx).await;

        let welcome = next_event(&mut rx).await;
        assert_eq!(welcome["type"], "connection");
        assert_eq!(welcome["data"]["clientId"], id.as_str());
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn registered_ids_are_unique() {
        let registry = ConnectionRegistry::new();
        let mut ids = std::collections::HashSet::new();
        let mut receivers = Vec::new();
        for _ in 0..50 {
            let (tx, rx) = channel();
            receivers.push(rx);
            assert!(ids.insert(registry.register(tx).await));
        }
        assert_eq!(registry.count().await, 50);
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = channel();
        let id = registry.register(tx).await;

        registry.unregister(&id).await;
        registry.unregister(&id).await;
        registry.unregister(&ConnectionId::from("never_registered")).await;
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn subscribe_confirms_with_full_set() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = channel();
        let id = registry.register(tx).await;
        let _ = next_event(&mut rx).await; // welcome

        registry.subscribe(&id, &["alerts".into()]).await;
        let first = next_event(&mut rx).await;
        assert_eq!(first["type"], "subscription_confirmed");
        assert_eq!(first["data"]["channels"], serde_json::json!(["alerts"]));

        registry.subscribe(&id, &["training".into()]).await;
        let second = next_event(&mut rx).await;
        assert_eq!(
            second["data"]["channels"],
            serde_json::json!(["alerts", "training"])
        );
    }

    #[tokio::test]
    async fn subscribe_twice_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = channel();
        let id = registry.register(tx).await;

        registry.subscribe(&id, &["a".into()]).await;
        registry.subscribe(&id, &["a".into()]).await;
        let subs = registry.subscriptions_of(&id).await;
        assert_eq!(subs.len(), 1);
        assert!(subs.contains("a"));
    }

    #[tokio::test]
    async fn subscribe_absent_connection_is_noop() {
        let registry = ConnectionRegistry::new();
        registry
            .subscribe(&ConnectionId::from("ghost"), &["a".into()])
            .await;
        assert!(registry
            .subscriptions_of(&ConnectionId::from("ghost"))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn unsubscribe_removes_topics() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = channel();
        let id = registry.register(tx).await;

        registry.subscribe(&id, &["a".into(), "b".into()]).await;
        registry.unsubscribe(&id, &["a".into()]).await;
        let subs = registry.subscriptions_of(&id).await;
        assert_eq!(subs.len(), 1);
        assert!(subs.contains("b"));
    }

    #[tokio::test]
    async fn subscriptions_of_absent_is_empty() {
        let registry = ConnectionRegistry::new();
        assert!(registry
            .subscriptions_of(&ConnectionId::from("ghost"))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn touch_updates_liveness() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = channel();
        let id = registry.register(tx).await;

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        registry.touch(&id).await;
        let conn = registry.get(&id).await.unwrap();
        assert!(conn.idle_time() < std::time::Duration::from_millis(20));
    }

    #[tokio::test]
    async fn snapshot_lists_all_connections() {
        let registry = ConnectionRegistry::new();
        let (tx1, _rx1) = channel();
        let (tx2, _rx2) = channel();
        let _ = registry.register(tx1).await;
        let _ = registry.register(tx2).await;
        assert_eq!(registry.snapshot().await.len(), 2);
    }
}
