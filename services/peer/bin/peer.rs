//! Main Entrypoint for the Reference Assistant Peer
//!
//! Loads configuration, installs logging, and serves `/ws/chat/{session_id}`
//! with the echo responder until Ctrl+C.

use agentchat_peer::{
    config::Config, responder::EchoResponder, router::create_router, state::AppState,
};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();

    // --- 3. Build Router ---
    let app_state = Arc::new(AppState {
        responder: Arc::new(EchoResponder),
    });
    let app = create_router(app_state);

    // --- 4. Start Server ---
    info!(bind_address = %config.bind_address, "Starting assistant peer...");
    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .context("Failed to bind listener")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server has shut down.");
    Ok(())
}
