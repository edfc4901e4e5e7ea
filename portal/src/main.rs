//! Ticket portal HTTP server.
//!
//! Serves the captive landing page, the catalog listing and the purchase flow
//! in front of the remote ticket service.

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use ticket_portal::{
    Config, HttpTicketService, TicketService,
    server::{AppState, build_router},
};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=debug", config.server.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ticket portal");

    config.validate().context("Invalid configuration")?;
    info!(
        ticket_api = %config.ticket_api.url,
        captive_path = %config.routes.captive_path,
        purchase_entry_path = %config.gateway.purchase_entry_path,
        max_sessions = config.sessions.max_sessions,
        "Configuration loaded"
    );

    // Prometheus exporter
    let metrics_address: SocketAddr = config
        .metrics_address()
        .parse()
        .context("Invalid metrics address")?;
    PrometheusBuilder::new()
        .with_http_listener(metrics_address)
        .install()
        .context("Failed to install Prometheus exporter")?;
    info!(address = %metrics_address, "Prometheus metrics available at /metrics");

    // Ticket service client
    let service: Arc<dyn TicketService> = Arc::new(
        HttpTicketService::new(config.ticket_api_url()?).context("Invalid ticket service URL")?,
    );

    let app = build_router(AppState::new(service, &config));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
