//! Dispatch of detected alerts to the notifier service

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Flat payload sent to the notifier's dispatch endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HighPhAlert {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "deviceId")]
    pub device_id: String,
    #[serde(rename = "pHLevel")]
    pub ph_level: f64,
}

/// Outbound alert delivery to the notifier
#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    async fn dispatch(&self, alert: &HighPhAlert) -> Result<(), DispatchError>;
}

/// Dispatcher POSTing to the notifier's HTTP address
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    http_client: reqwest::Client,
    url: String,
    service_key: Option<String>,
}

impl HttpDispatcher {
    pub fn new(url: impl Into<String>, service_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            url: url.into(),
            service_key,
        }
    }
}

#[async_trait]
impl AlertDispatcher for HttpDispatcher {
    async fn dispatch(&self, alert: &HighPhAlert) -> Result<(), DispatchError> {
        let mut request = self.http_client.post(&self.url).json(alert);

        if let Some(key) = &self.service_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DispatchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body: error_text,
            });
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Notifier returned status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_wire_names() {
        let alert = HighPhAlert {
            user_id: "user-1".to_string(),
            device_id: "tank-2".to_string(),
            ph_level: 8.9,
        };
        let json = serde_json::to_value(&alert).unwrap();

        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["deviceId"], "tank-2");
        assert_eq!(json["pHLevel"], 8.9);
    }
}
