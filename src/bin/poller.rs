//! Aquamon Poller
//!
//! Run with: cargo run --bin poller
//!
//! Environment variables:
//! - AQUAMON_TELEMETRY_URL: Telemetry store base URL
//! - AQUAMON_TELEMETRY_AUTH: Telemetry store access secret
//! - AQUAMON_NOTIFY_URL: Notifier dispatch endpoint
//!   (default: http://localhost:8080/notify)
//! - AQUAMON_SERVICE_KEY: Bearer secret sent on dispatch calls
//! - AQUAMON_POLL_INTERVAL_SECS: Seconds between poll passes (default: 10)
//! - AQUAMON_POLLER_PORT: Liveness listener port (default: 8081)
//! - RUST_LOG: Log level (default: info)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use aquamon::api::liveness_router;
use aquamon::config::PollerConfig;
use aquamon::monitor::{HttpDispatcher, PollWorker};
use aquamon::telemetry::RestTelemetryClient;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aquamon=info,poller=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PollerConfig::from_env();

    tracing::info!("Poller configuration:");
    tracing::info!("  Telemetry store: {}", config.telemetry_url);
    tracing::info!("  Notifier endpoint: {}", config.notify_url);
    tracing::info!("  Poll interval: {} seconds", config.poll_interval_secs);
    tracing::info!("  Liveness port: {}", config.liveness_port);

    let telemetry = Arc::new(RestTelemetryClient::new(
        config.telemetry_url.clone(),
        config.telemetry_auth.clone(),
    ));
    let dispatcher = Arc::new(HttpDispatcher::new(
        config.notify_url.clone(),
        config.service_key.clone(),
    ));

    let worker = Arc::new(PollWorker::new(
        telemetry,
        dispatcher,
        Duration::from_secs(config.poll_interval_secs),
    ));
    let worker_handle = Arc::clone(&worker).start();

    // The hosting platform requires a listener even though the poller is
    // timer-driven
    let app = liveness_router(worker.status());
    let addr: SocketAddr = format!("0.0.0.0:{}", config.liveness_port).parse()?;
    tracing::info!("Starting poller liveness listener on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&worker)))
        .await?;

    worker_handle.abort();
    tracing::info!("Poller stopped");
    Ok(())
}

async fn shutdown_signal(worker: Arc<PollWorker>) {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");

    tracing::info!("Shutdown signal received, stopping poll worker...");
    worker.stop();
}
