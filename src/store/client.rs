//! REST client for the user document store

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::model::{NotificationEntry, UserDoc};

/// Access to user documents and their notification logs
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Read `users/{userId}`; `None` when the document does not exist
    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserDoc>, StoreError>;

    /// Append an entry to `users/{userId}/notifications`
    async fn append_notification(
        &self,
        user_id: &str,
        entry: &NotificationEntry,
    ) -> Result<(), StoreError>;
}

/// Document store client
#[derive(Debug, Clone)]
pub struct RestUserStore {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestUserStore {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
            api_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl UserStore for RestUserStore {
    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserDoc>, StoreError> {
        let response = self
            .with_auth(self.http_client.get(self.url(&format!("users/{}", user_id))))
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StoreError::Store(error_text));
        }

        let user: UserDoc = response
            .json()
            .await
            .map_err(|e| StoreError::Deserialization(e.to_string()))?;

        Ok(Some(user))
    }

    async fn append_notification(
        &self,
        user_id: &str,
        entry: &NotificationEntry,
    ) -> Result<(), StoreError> {
        let response = self
            .with_auth(
                self.http_client
                    .post(self.url(&format!("users/{}/notifications", user_id)))
                    .json(entry),
            )
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StoreError::Store(error_text));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_cleanly() {
        let store = RestUserStore::new("http://docs.local/", None);
        assert_eq!(store.url("users/u1"), "http://docs.local/users/u1");
        assert_eq!(
            store.url("users/u1/notifications"),
            "http://docs.local/users/u1/notifications"
        );
    }
}
