//! # reef-dashboard
//!
//! reefwatch dashboard server binary — wires together all crates and starts
//! the HTTP/WebSocket server.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use reef_server::feed::{run_feed, FeedTiming};
use reef_server::websocket::heartbeat::run_heartbeat;
use reef_server::{ReefServer, ServerConfig};
use reef_settings::{load_settings_from_path, settings_path, ReefSettings};
use reef_store::{ConnectionConfig, ModelStore};
use reef_training::SimulatorTiming;

/// reefwatch dashboard server.
#[derive(Parser, Debug)]
#[command(name = "reef-dashboard", about = "Marine-research dashboard backend")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings; 0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` model database (overrides settings).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Path to the settings file.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Disable the simulated live-data feed.
    #[arg(long)]
    no_feed: bool,
}

impl Cli {
    fn resolve_db_path(&self, settings: &ReefSettings) -> PathBuf {
        if let Some(path) = &self.db_path {
            return path.clone();
        }
        let configured = PathBuf::from(&settings.database.path);
        if configured.is_absolute() {
            return configured;
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home).join(".reefwatch").join(configured)
    }
}

fn ensure_parent_dir(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    reef_core::logging::init_subscriber("info");
    let cli = Cli::parse();

    let settings_file = cli.settings.clone().unwrap_or_else(settings_path);
    let mut settings = load_settings_from_path(&settings_file)
        .with_context(|| format!("Failed to load settings from {}", settings_file.display()))?;
    if let Some(host) = &cli.host {
        settings.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }

    let db_path = cli.resolve_db_path(&settings);
    ensure_parent_dir(&db_path)?;
    let db_path_str = db_path
        .to_str()
        .context("database path is not valid UTF-8")?;
    let pool = reef_store::new_file(db_path_str, &ConnectionConfig::default())?;
    {
        let conn = pool.get()?;
        let _ = reef_store::run_migrations(&conn)?;
    }
    let store = Arc::new(ModelStore::new(pool));
    info!(db = %db_path.display(), "model store ready");

    let metrics_handle = reef_server::metrics::install_recorder();
    let config = ServerConfig::from(&settings.server);
    let timing = SimulatorTiming {
        epoch_duration: Duration::from_millis(settings.training.epoch_duration_ms),
        validation_pause: Duration::from_millis(settings.training.validation_pause_ms),
    };
    let server = ReefServer::new(config.clone(), store, timing, Some(metrics_handle));
    let shutdown = server.shutdown().clone();
    let controller = server.controller().clone();

    let mut background = Vec::new();
    background.push(tokio::spawn(run_heartbeat(
        server.registry().clone(),
        Duration::from_secs(config.heartbeat_interval_secs),
        Duration::from_secs(config.heartbeat_timeout_secs),
        shutdown.token(),
    )));

    if settings.feed.enabled && !cli.no_feed {
        background.push(tokio::spawn(run_feed(
            server.hub().clone(),
            server.registry().clone(),
            controller.clone(),
            FeedTiming::from(&settings.feed),
            shutdown.token(),
        )));
    }

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %listener.local_addr()?, "reefwatch dashboard listening");

    let shutdown_signal = shutdown.token();
    axum::serve(listener, server.router())
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("ctrl-c received, shutting down");
                }
                () = shutdown_signal.cancelled() => {}
            }
        })
        .await?;

    controller.shutdown().await;
    shutdown.graceful_shutdown(background, None).await;
    info!("shutdown complete");
    Ok(())
}
