//! Chatwoot Relay - webhook receiver and WebSocket fan-out.
//!
//! This binary runs a single HTTP + WebSocket server that:
//! - Receives Chatwoot webhooks
//! - Verifies the HMAC signature
//! - Pushes agent messages and status changes to every connected browser
//! - Returns 200 as soon as the broadcast is queued

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatwoot_relay::web::{serve, WEBHOOK_PATH};
use chatwoot_relay::{AppState, BroadcastHub, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("relay_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        webhook_secret_configured = config.is_signature_verification_enabled(),
        frontend_url = %config.frontend_url,
        version = %config.version,
        "config_loaded"
    );

    if !config.is_signature_verification_enabled() {
        info!("webhook_signature_verification_disabled");
    }

    let state = AppState::new(config.clone(), BroadcastHub::new());

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(
        address = %addr,
        websocket = %format!("ws://localhost:{}", config.port),
        health = %format!("http://localhost:{}/health", config.port),
        webhook = %format!("http://localhost:{}{}", config.port, WEBHOOK_PATH),
        "relay_listening"
    );

    // Run server with graceful shutdown
    serve(listener, state, shutdown_signal()).await?;

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
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
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
