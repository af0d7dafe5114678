use axum::{
    routing::{get, post},
    Json, Router,
};
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{health_check, notify, AppState};
use crate::config::NotifierConfig;
use crate::monitor::PollerStatus;
use crate::push::FcmClient;
use crate::store::RestUserStore;

/// Build the notifier application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Notification dispatch
        .route("/notify", post(notify))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Minimal listener for the poller process; the hosting platform requires
/// one, and `/status` exposes the worker's counters
pub fn liveness_router(status: Arc<RwLock<PollerStatus>>) -> Router {
    Router::new()
        .route("/", get(|| async { "Polling active" }))
        .route(
            "/status",
            get(move || {
                let status = Arc::clone(&status);
                async move { Json(status.read().clone()) }
            }),
        )
        .layer(TraceLayer::new_for_http())
}

/// Run the notifier HTTP service
pub async fn run_server(config: NotifierConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState {
        users: Arc::new(RestUserStore::new(
            config.store_url.clone(),
            config.store_key.clone(),
        )),
        gateway: Arc::new(FcmClient::new(
            config.push_url.clone(),
            config.push_server_key.clone(),
        )),
        service_key: config.service_key.clone(),
    });

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Starting notifier service on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Notifier service stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::{PushError, PushGateway, PushMessage};
    use crate::store::{NotificationEntry, StoreError, UserDoc, UserStore};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use tower::util::ServiceExt;

    #[derive(Default)]
    struct FakeUserStore {
        users: HashMap<String, UserDoc>,
        appended: Mutex<Vec<(String, NotificationEntry)>>,
    }

    impl FakeUserStore {
        fn with_user(mut self, user_id: &str, token: Option<&str>) -> Self {
            self.users.insert(
                user_id.to_string(),
                UserDoc {
                    fcm_token: token.map(String::from),
                },
            );
            self
        }
    }

    #[async_trait]
    impl UserStore for FakeUserStore {
        async fn fetch_user(&self, user_id: &str) -> Result<Option<UserDoc>, StoreError> {
            Ok(self.users.get(user_id).cloned())
        }

        async fn append_notification(
            &self,
            user_id: &str,
            entry: &NotificationEntry,
        ) -> Result<(), StoreError> {
            self.appended
                .lock()
                .push((user_id.to_string(), entry.clone()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeGateway {
        reject_with: Option<serde_json::Value>,
        sent: Mutex<Vec<PushMessage>>,
    }

    #[async_trait]
    impl PushGateway for FakeGateway {
        async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
            if let Some(body) = &self.reject_with {
                return Err(PushError::Gateway {
                    status: 401,
                    body: body.clone(),
                });
            }
            self.sent.lock().push(message.clone());
            Ok(())
        }
    }

    fn make_app(users: FakeUserStore, gateway: FakeGateway, service_key: Option<&str>) -> Router {
        let state = Arc::new(AppState {
            users: Arc::new(users),
            gateway: Arc::new(gateway),
            service_key: service_key.map(String::from),
        });
        build_router(state)
    }

    fn notify_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/notify")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = make_app(FakeUserStore::default(), FakeGateway::default(), None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_body_is_rejected() {
        let app = make_app(FakeUserStore::default(), FakeGateway::default(), None);

        let response = app.oneshot(notify_request(serde_json::json!({}))).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Missing or invalid userId or pHLevel");
    }

    #[tokio::test]
    async fn test_non_numeric_ph_is_rejected() {
        let app = make_app(
            FakeUserStore::default().with_user("user-1", Some("tok")),
            FakeGateway::default(),
            None,
        );

        let response = app
            .oneshot(notify_request(serde_json::json!({
                "userId": "user-1",
                "pHLevel": "not-a-number"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Missing or invalid userId or pHLevel");
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let app = make_app(FakeUserStore::default(), FakeGateway::default(), None);

        let response = app
            .oneshot(notify_request(serde_json::json!({
                "userId": "nobody",
                "pHLevel": 9.0
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "User not found");
    }

    #[tokio::test]
    async fn test_user_without_token() {
        let app = make_app(
            FakeUserStore::default().with_user("user-1", None),
            FakeGateway::default(),
            None,
        );

        let response = app
            .oneshot(notify_request(serde_json::json!({
                "userId": "user-1",
                "pHLevel": 9.0
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "No FCM token for user");
    }

    #[tokio::test]
    async fn test_gateway_failure_passes_details_and_skips_log() {
        let users = Arc::new(FakeUserStore::default().with_user("user-1", Some("tok")));
        let gateway = FakeGateway {
            reject_with: Some(serde_json::json!({ "error": "InvalidRegistration" })),
            ..FakeGateway::default()
        };
        let state = Arc::new(AppState {
            users: Arc::clone(&users) as Arc<dyn UserStore>,
            gateway: Arc::new(gateway),
            service_key: None,
        });
        let app = build_router(state);

        let response = app
            .oneshot(notify_request(serde_json::json!({
                "userId": "user-1",
                "pHLevel": 9.0
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Notification failed");
        assert_eq!(body["details"]["error"], "InvalidRegistration");

        // A rejected push is never logged
        assert!(users.appended.lock().is_empty());
    }

    #[tokio::test]
    async fn test_successful_dispatch_logs_once() {
        let users = Arc::new(FakeUserStore::default().with_user("user-1", Some("tok-9")));
        let gateway = Arc::new(FakeGateway::default());
        let state = Arc::new(AppState {
            users: Arc::clone(&users) as Arc<dyn UserStore>,
            gateway: Arc::clone(&gateway) as Arc<dyn PushGateway>,
            service_key: None,
        });
        let app = build_router(state);

        let response = app
            .oneshot(notify_request(serde_json::json!({
                "userId": "user-1",
                "deviceId": "tank-1",
                "pHLevel": 9.1
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "Notification sent and logged");

        let sent = gateway.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "tok-9");
        assert!(sent[0].notification.body.contains("9.1"));

        let appended = users.appended.lock();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].0, "user-1");
        assert!(!appended[0].1.is_read);
    }

    #[tokio::test]
    async fn test_numeric_string_ph_accepted() {
        let users = Arc::new(FakeUserStore::default().with_user("user-1", Some("tok")));
        let state = Arc::new(AppState {
            users: Arc::clone(&users) as Arc<dyn UserStore>,
            gateway: Arc::new(FakeGateway::default()),
            service_key: None,
        });
        let app = build_router(state);

        let response = app
            .oneshot(notify_request(serde_json::json!({
                "userId": "user-1",
                "pHLevel": "9.3"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(users.appended.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_bearer_enforced_when_configured() {
        let app = make_app(
            FakeUserStore::default().with_user("user-1", Some("tok")),
            FakeGateway::default(),
            Some("secret"),
        );

        let response = app
            .clone()
            .oneshot(notify_request(serde_json::json!({
                "userId": "user-1",
                "pHLevel": 9.0
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let mut request = notify_request(serde_json::json!({
            "userId": "user-1",
            "pHLevel": 9.0
        }));
        request
            .headers_mut()
            .insert("authorization", "Bearer secret".parse().unwrap());
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_liveness_router() {
        let status = Arc::new(RwLock::new(PollerStatus::default()));
        status.write().cycles_completed = 3;
        let app = liveness_router(Arc::clone(&status));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["cycles_completed"], 3);
    }
}
