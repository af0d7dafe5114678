//! REST client for the telemetry store

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use super::model::{AlertRecord, DeviceRecord};

/// Access to the device-telemetry store
///
/// The device snapshot is an unordered map; iteration order is unspecified.
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    /// Fetch the full `devices/*` snapshot
    async fn fetch_devices(&self) -> Result<HashMap<String, DeviceRecord>, TelemetryError>;

    /// Upsert an alert record at `alerts/{deviceId}`
    async fn put_alert(&self, device_id: &str, alert: &AlertRecord) -> Result<(), TelemetryError>;
}

/// Telemetry store client speaking the realtime database's REST dialect
#[derive(Debug, Clone)]
pub struct RestTelemetryClient {
    http_client: reqwest::Client,
    base_url: String,
    auth: Option<String>,
}

impl RestTelemetryClient {
    pub fn new(base_url: impl Into<String>, auth: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
            auth,
        }
    }

    /// Path endpoint, e.g. `devices` -> `{base}/devices.json?auth=...`
    fn url(&self, path: &str) -> String {
        let mut url = format!("{}/{}.json", self.base_url.trim_end_matches('/'), path);
        if let Some(auth) = &self.auth {
            url.push_str("?auth=");
            url.push_str(auth);
        }
        url
    }
}

#[async_trait]
impl TelemetryStore for RestTelemetryClient {
    async fn fetch_devices(&self) -> Result<HashMap<String, DeviceRecord>, TelemetryError> {
        let response = self
            .http_client
            .get(self.url("devices"))
            .send()
            .await
            .map_err(|e| TelemetryError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TelemetryError::Store(error_text));
        }

        // The store returns JSON `null` for an empty tree
        let devices: Option<HashMap<String, DeviceRecord>> = response
            .json()
            .await
            .map_err(|e| TelemetryError::Deserialization(e.to_string()))?;

        Ok(devices.unwrap_or_default())
    }

    async fn put_alert(&self, device_id: &str, alert: &AlertRecord) -> Result<(), TelemetryError> {
        let response = self
            .http_client
            .put(self.url(&format!("alerts/{}", device_id)))
            .json(alert)
            .send()
            .await
            .map_err(|e| TelemetryError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TelemetryError::Store(error_text));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}
