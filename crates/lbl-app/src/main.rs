//! Web application for labeling CSV rows with a fixed set of categories

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod markdown;
mod render;
mod routes;

use config::AppConfig;
use routes::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let config = AppConfig::from_env()?;
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", config.data_dir))?;

    let state = Arc::new(AppState::new(&config.data_dir));
    if !state.tables.has_table() {
        info!("No table loaded yet; waiting for an upload");
    }
    let router = build_router(state, config.max_upload_bytes);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Labeling tool listening on http://{} (data in {:?})", addr, config.data_dir);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down gracefully"),
        Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
    }
}
