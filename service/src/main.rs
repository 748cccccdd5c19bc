//! `rsvp-service` entry point.
//!
//! Reads configuration from the environment (and `.env`), binds the HTTP
//! listener and serves until Ctrl+C.

use std::net::SocketAddr;

use anyhow::Context;
use rsvp_protocol::wire::WhatsAppStatus;
use rsvp_service::AppState;
use rsvp_service::config::ServiceConfig;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServiceConfig::from_env().context("invalid service configuration")?;
    tracing::info!("rsvp-service v{} starting", env!("CARGO_PKG_VERSION"));

    let state = AppState::from_config(&config);
    let whatsapp = WhatsAppStatus::from_configured(state.notifier.is_configured());
    tracing::info!("RSVP log at {}", state.store.data_file().display());

    let addr = SocketAddr::new(config.bind_host, config.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("RSVP backend running on http://{addr}");
    tracing::info!("WhatsApp status: {}", whatsapp.as_str());

    rsvp_service::http::serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
    })
    .await
    .context("HTTP server failed")?;

    tracing::info!("rsvp-service exiting cleanly");
    Ok(())
}
