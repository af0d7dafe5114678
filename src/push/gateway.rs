//! Legacy FCM send-API client

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Fixed notification title for high-pH alerts
pub const HIGH_PH_TITLE: &str = "High pH Alert";

/// Message envelope for the legacy send API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushMessage {
    /// Target device token
    pub to: String,
    pub notification: PushNotification,
    pub android: AndroidOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AndroidOptions {
    pub priority: String,
}

impl PushMessage {
    /// High-priority high-pH alert for a device token
    pub fn high_ph(token: impl Into<String>, ph_level: f64) -> Self {
        Self {
            to: token.into(),
            notification: PushNotification {
                title: HIGH_PH_TITLE.to_string(),
                body: high_ph_body(ph_level),
            },
            android: AndroidOptions {
                priority: "high".to_string(),
            },
        }
    }
}

/// Templated alert body embedding the measurement
pub fn high_ph_body(ph_level: f64) -> String {
    format!("Warning: Your aquarium pH level is too high ({})!", ph_level)
}

/// Outbound push delivery
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Send a message; a non-success gateway response is an error carrying
    /// the gateway's body verbatim
    async fn send(&self, message: &PushMessage) -> Result<(), PushError>;
}

/// Client for the legacy key-authorized send endpoint
#[derive(Debug, Clone)]
pub struct FcmClient {
    http_client: reqwest::Client,
    url: String,
    server_key: String,
}

impl FcmClient {
    pub fn new(url: impl Into<String>, server_key: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            url: url.into(),
            server_key: server_key.into(),
        }
    }
}

#[async_trait]
impl PushGateway for FcmClient {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
        let response = self
            .http_client
            .post(&self.url)
            .header("Authorization", format!("key={}", self.server_key))
            .json(message)
            .send()
            .await
            .map_err(|e| PushError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // The gateway answers JSON on rejection; fall back to raw text
            let text = response.text().await.unwrap_or_default();
            let body = serde_json::from_str(&text)
                .unwrap_or_else(|_| serde_json::Value::String(text));
            return Err(PushError::Gateway {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Gateway returned status {status}")]
    Gateway { status: u16, body: serde_json::Value },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_ph_envelope() {
        let message = PushMessage::high_ph("tok-1", 9.2);
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["to"], "tok-1");
        assert_eq!(json["notification"]["title"], "High pH Alert");
        assert_eq!(
            json["notification"]["body"],
            "Warning: Your aquarium pH level is too high (9.2)!"
        );
        assert_eq!(json["android"]["priority"], "high");
    }

    #[test]
    fn test_body_embeds_measurement() {
        assert!(high_ph_body(8.6).contains("8.6"));
        assert!(high_ph_body(10.0).contains("10"));
    }
}
