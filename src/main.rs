//! Aquamon Notifier Service
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - AQUAMON_HOST: Bind address (default: 0.0.0.0)
//! - AQUAMON_PORT: Port number (default: 8080)
//! - AQUAMON_SERVICE_KEY: Shared bearer secret; dispatch requests must carry
//!   it when set (default: unset, no check)
//! - AQUAMON_STORE_URL: User document store base URL
//! - AQUAMON_STORE_KEY: Document store access key
//! - AQUAMON_PUSH_URL: Push gateway endpoint (default: FCM legacy send API)
//! - AQUAMON_PUSH_SERVER_KEY: Legacy gateway server key
//! - RUST_LOG: Log level (default: info)

use aquamon::api::run_server;
use aquamon::config::NotifierConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aquamon=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = NotifierConfig::from_env();

    tracing::info!("Notifier configuration:");
    tracing::info!("  Host: {}:{}", config.host, config.port);
    tracing::info!("  Document store: {}", config.store_url);
    tracing::info!("  Push gateway: {}", config.push_url);
    tracing::info!(
        "  Bearer check: {}",
        if config.service_key.is_some() {
            "ENABLED"
        } else {
            "disabled"
        }
    );

    println!(
        r#"
     /\
    /  \   __ _ _   _  __ _ _ __ ___   ___  _ __
   / /\ \ / _` | | | |/ _` | '_ ` _ \ / _ \| '_ \
  / ____ \ (_| | |_| | (_| | | | | | | (_) | | | |
 /_/    \_\__, |\__,_|\__,_|_| |_| |_|\___/|_| |_|
             |_|
 Aquarium Telemetry Monitor - Notifier
 Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );

    run_server(config).await
}
