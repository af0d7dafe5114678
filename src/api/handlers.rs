use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::push::{self, PushError, PushGateway, PushMessage};
use crate::store::{NotificationEntry, UserStore};

/// Application state shared across handlers
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub gateway: Arc<dyn PushGateway>,
    /// Shared bearer secret; `None` disables the check
    pub service_key: Option<String>,
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Notification Dispatch
// ============================================================================

/// `POST /notify`
///
/// The body is taken as raw JSON so that missing or mistyped fields produce
/// the contract's 400 body rather than a deserialization rejection. A
/// numeric string for `pHLevel` is accepted; extra fields (the poller sends
/// `deviceId`) are ignored.
pub async fn notify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Some(key) = &state.service_key {
        if !bearer_matches(&headers, key) {
            return Err(ApiError::Unauthorized);
        }
    }

    let user_id = body
        .get("userId")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::InvalidRequest)?;
    let ph_level = body
        .get("pHLevel")
        .and_then(parse_ph_level)
        .ok_or(ApiError::InvalidRequest)?;

    let user = state
        .users
        .fetch_user(user_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or(ApiError::UserNotFound)?;

    let token = user.fcm_token.ok_or(ApiError::NoToken)?;

    let message = PushMessage::high_ph(token, ph_level);
    state.gateway.send(&message).await.map_err(|e| match e {
        PushError::Gateway { body, .. } => ApiError::NotificationFailed(body),
        PushError::Network(msg) => ApiError::NotificationFailed(serde_json::Value::String(msg)),
    })?;

    // Logged only after the gateway accepted the message
    let entry = NotificationEntry::new(push::HIGH_PH_TITLE, push::high_ph_body(ph_level));
    state
        .users
        .append_notification(user_id, &entry)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user_id, ph_level, "Notification sent and logged");

    Ok(Json(serde_json::json!({
        "status": "Notification sent and logged"
    })))
}

/// Numbers and numeric strings both qualify
fn parse_ph_level(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn bearer_matches(headers: &HeaderMap, key: &str) -> bool {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == key)
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    InvalidRequest,
    UserNotFound,
    NoToken,
    /// Gateway rejected the push; carries the gateway's body verbatim
    NotificationFailed(serde_json::Value),
    /// Anything unexpected; detail is logged server-side only
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": "Unauthorized" }),
            ),
            ApiError::InvalidRequest => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "Missing or invalid userId or pHLevel" }),
            ),
            ApiError::UserNotFound => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": "User not found" }),
            ),
            ApiError::NoToken => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "No FCM token for user" }),
            ),
            ApiError::NotificationFailed(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": "Notification failed", "details": details }),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ph_level() {
        assert_eq!(parse_ph_level(&serde_json::json!(8.9)), Some(8.9));
        assert_eq!(parse_ph_level(&serde_json::json!(9)), Some(9.0));
        assert_eq!(parse_ph_level(&serde_json::json!("9.1")), Some(9.1));
        assert_eq!(parse_ph_level(&serde_json::json!("abc")), None);
        assert_eq!(parse_ph_level(&serde_json::json!(null)), None);
        assert_eq!(parse_ph_level(&serde_json::json!({})), None);
    }

    #[test]
    fn test_bearer_matches() {
        let mut headers = HeaderMap::new();
        assert!(!bearer_matches(&headers, "secret"));

        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Bearer secret".parse().unwrap(),
        );
        assert!(bearer_matches(&headers, "secret"));
        assert!(!bearer_matches(&headers, "other"));
    }
}
