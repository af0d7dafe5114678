//! Environment-driven configuration for both processes

use serde::{Deserialize, Serialize};

/// Default legacy FCM send endpoint
pub const DEFAULT_PUSH_URL: &str = "https://fcm.googleapis.com/fcm/send";

/// Configuration for the notifier HTTP service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Shared bearer secret; when set, dispatch requests must carry it
    pub service_key: Option<String>,
    /// Document store base URL
    pub store_url: String,
    /// Document store access key
    pub store_key: Option<String>,
    /// Push gateway endpoint
    pub push_url: String,
    /// Legacy push gateway server key
    pub push_server_key: String,
}

impl NotifierConfig {
    /// Build from environment variables, falling back to defaults:
    /// AQUAMON_HOST=0.0.0.0
    /// AQUAMON_PORT=8080
    /// AQUAMON_SERVICE_KEY=<unset>
    /// AQUAMON_STORE_URL=http://localhost:9090
    /// AQUAMON_STORE_KEY=<unset>
    /// AQUAMON_PUSH_URL=https://fcm.googleapis.com/fcm/send
    /// AQUAMON_PUSH_SERVER_KEY=<empty>
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("AQUAMON_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("AQUAMON_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            service_key: std::env::var("AQUAMON_SERVICE_KEY").ok().filter(|k| !k.is_empty()),
            store_url: std::env::var("AQUAMON_STORE_URL")
                .unwrap_or_else(|_| "http://localhost:9090".to_string()),
            store_key: std::env::var("AQUAMON_STORE_KEY").ok().filter(|k| !k.is_empty()),
            push_url: std::env::var("AQUAMON_PUSH_URL")
                .unwrap_or_else(|_| DEFAULT_PUSH_URL.to_string()),
            push_server_key: std::env::var("AQUAMON_PUSH_SERVER_KEY").unwrap_or_default(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            service_key: None,
            store_url: "http://localhost:9090".to_string(),
            store_key: None,
            push_url: DEFAULT_PUSH_URL.to_string(),
            push_server_key: String::new(),
        }
    }
}

/// Configuration for the poller process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Telemetry store base URL
    pub telemetry_url: String,
    /// Telemetry store access secret, appended as `?auth=`
    pub telemetry_auth: Option<String>,
    /// Full URL of the notifier dispatch endpoint
    pub notify_url: String,
    /// Bearer secret sent on dispatch calls
    pub service_key: Option<String>,
    /// Seconds between poll passes
    pub poll_interval_secs: u64,
    /// Liveness listener port
    pub liveness_port: u16,
}

impl PollerConfig {
    /// Build from environment variables, falling back to defaults:
    /// AQUAMON_TELEMETRY_URL=http://localhost:9000
    /// AQUAMON_TELEMETRY_AUTH=<unset>
    /// AQUAMON_NOTIFY_URL=http://localhost:8080/notify
    /// AQUAMON_SERVICE_KEY=<unset>
    /// AQUAMON_POLL_INTERVAL_SECS=10
    /// AQUAMON_POLLER_PORT=8081
    pub fn from_env() -> Self {
        Self {
            telemetry_url: std::env::var("AQUAMON_TELEMETRY_URL")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),
            telemetry_auth: std::env::var("AQUAMON_TELEMETRY_AUTH").ok().filter(|k| !k.is_empty()),
            notify_url: std::env::var("AQUAMON_NOTIFY_URL")
                .unwrap_or_else(|_| "http://localhost:8080/notify".to_string()),
            service_key: std::env::var("AQUAMON_SERVICE_KEY").ok().filter(|k| !k.is_empty()),
            poll_interval_secs: std::env::var("AQUAMON_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            liveness_port: std::env::var("AQUAMON_POLLER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8081),
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            telemetry_url: "http://localhost:9000".to_string(),
            telemetry_auth: None,
            notify_url: "http://localhost:8080/notify".to_string(),
            service_key: None,
            poll_interval_secs: 10,
            liveness_port: 8081,
        }
    }
}
