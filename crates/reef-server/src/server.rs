//! `ReefServer` — Axum HTTP + WebSocket server assembly.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use reef_store::ModelStore;
use reef_training::{SimulatorTiming, TrainingController};

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::routes;
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::broadcast::BroadcastHub;
use crate::websocket::registry::ConnectionRegistry;
use crate::websocket::session::run_ws_session;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Connection registry.
    pub registry: Arc<ConnectionRegistry>,
    /// Broadcast hub for event fan-out.
    pub hub: Arc<BroadcastHub>,
    /// Training controller.
    pub controller: Arc<TrainingController>,
    /// Model store.
    pub store: Arc<ModelStore>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus render handle (absent in tests).
    pub metrics_handle: Option<PrometheusHandle>,
    /// Server configuration.
    pub config: ServerConfig,
}

/// The main reefwatch server.
pub struct ReefServer {
    state: AppState,
}

impl ReefServer {
    /// Wire up the registry, hub, and controller over the given store.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        store: Arc<ModelStore>,
        timing: SimulatorTiming,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let hub = Arc::new(BroadcastHub::new(registry.clone()));
        let controller = Arc::new(TrainingController::new(
            store.clone(),
            hub.clone(),
            timing,
        ));

        Self {
            state: AppState {
                registry,
                hub,
                controller,
                store,
                shutdown: Arc::new(ShutdownCoordinator::new()),
                start_time: Instant::now(),
                metrics_handle,
                config,
            },
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/ws", get(ws_handler))
            .route("/api/models", get(routes::list_models))
            .route("/api/models/{id}", get(routes::get_model))
            .route("/api/models/{id}/metrics", get(routes::model_metrics))
            .route("/api/training", get(routes::active_training))
            .route("/api/training/start", post(routes::start_training))
            .route("/api/training/{id}", get(routes::training_progress))
            .route("/api/training/{id}/stop", post(routes::stop_training))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Get the connection registry.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.state.registry
    }

    /// Get the broadcast hub.
    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.state.hub
    }

    /// Get the training controller.
    pub fn controller(&self) -> &Arc<TrainingController> {
        &self.state.controller
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.state.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = state.registry.count().await;
    let active_jobs = state.controller.active_jobs().await.len();
    Json(health::health_check(state.start_time, connections, active_jobs))
}

/// GET /metrics — Prometheus text format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics_handle {
        Some(handle) => crate::metrics::render(&handle).into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// GET /ws — upgrade to a WebSocket session.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let capacity = state.config.send_queue_capacity;
    ws.on_upgrade(move |socket| {
        run_ws_session(socket, state.registry.clone(), state.hub.clone(), capacity)
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
