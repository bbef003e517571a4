/// Common test utilities for integration tests
///
/// Builds a full router around a chosen token engine and provides helpers
/// for driving requests through it.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Duration;
use serde_json::{json, Value};
use tokengate_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, TokenConfig},
};
use tokengate_shared::token::TokenKind;
use tower::ServiceExt;

pub const TEST_KEY: &str = "0123456789abcdef0123456789abcdef";
pub const TEST_PASSWORD: &str = "secret123";

/// Test context containing the router and its state
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
}

impl TestContext {
    /// Creates a context using `kind` as the token engine
    pub fn new(kind: TokenKind) -> Self {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            token: TokenConfig {
                kind,
                symmetric_key: TEST_KEY.to_string(),
                access_token_duration: Duration::minutes(15),
            },
        };

        let state = AppState::new(config).expect("test key fits both engines");
        let app = build_router(state.clone());

        TestContext { app, state }
    }

    /// Sends a request and returns status plus JSON body (Null if empty)
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);

        (status, value)
    }

    /// POSTs `body` as JSON to `uri`
    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// GETs `uri` with an optional raw Authorization header value
    pub async fn get_with_auth(&self, uri: &str, authorization: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Registers `username` with [`TEST_PASSWORD`]
    pub async fn create_user(&self, username: &str) {
        let (status, body) = self
            .post_json(
                "/v1/users",
                json!({
                    "username": username,
                    "password": TEST_PASSWORD,
                    "full_name": "Test User",
                    "email": format!("{}@example.com", username),
                }),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "create user failed: {}", body);
    }

    /// Mints a token directly through the configured maker
    pub fn token_for(&self, username: &str, duration: Duration) -> String {
        self.state
            .token_maker
            .create_token(username, duration)
            .unwrap()
    }
}
