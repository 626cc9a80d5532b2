mod api;
mod metrics;
mod refresh;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use panelboard_core::{load_config, validate_config, BoardCache, SheetsFetcher};

use api::create_router;
use refresh::spawn_refresh_loop;
use state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("PANELBOARD_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    if config.sheets.document_id.is_none() {
        warn!("No sheets.document_id configured; refresh cycles will fail until one is set");
    }
    info!(
        "Refresh interval: {}s, fetch timeout: {}ms, max attempts: {}",
        config.sheets.refresh_interval_secs, config.sheets.timeout_ms, config.sheets.max_attempts
    );

    // Create fetcher and snapshot cache
    let fetcher = Arc::new(
        SheetsFetcher::new(config.sheets.clone()).context("Failed to create sheets fetcher")?,
    );
    let cache = Arc::new(BoardCache::new());

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), cache, fetcher));

    // Spawn the periodic refresh task; the first cycle runs immediately and
    // a failure there keeps the empty snapshot rather than aborting startup.
    let refresh_handle = spawn_refresh_loop(Arc::clone(&state));
    info!("Refresh task started");

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    refresh_handle.abort();

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
