// =============================================================================
// StockScope — Main Entry Point
// =============================================================================
//
// Loads configuration from the environment, builds the shared analyzer state,
// and serves the REST API until Ctrl+C.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod analyzer;
mod api;
mod app_state;
mod config;
mod error;
mod indicators;
mod normalize;
mod provider;
mod report;
mod scoring;
mod types;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::AnalysisConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        StockScope Analysis Service — Starting Up         ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let config = AnalysisConfig::from_env().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load analysis config, using defaults");
        AnalysisConfig::default()
    });
    config.validate()?;

    // ── 2. Build shared state ────────────────────────────────────────────
    let state = Arc::new(AppState::new(config));

    // ── 3. Serve the API ─────────────────────────────────────────────────
    let bind_addr =
        std::env::var("STOCKSCOPE_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());

    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("StockScope shut down complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    warn!("Shutdown signal received — stopping gracefully");
}
