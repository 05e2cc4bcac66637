//! Shared helpers for route tests: an in-memory database, a mock currency
//! source and a router driven with `oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use reqwest::Client;
use serde_json::{json, Value};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceExt;

use crate::common::{config::AppConfig, migrations::create_schema, AppState};
use crate::services::currency::tests::MockCurrencySource;

pub const TEST_PASSWORD: &str = "Str0ng#Pass";

/// Single-connection in-memory pool; a memory database lives only as long
/// as its connection
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    create_schema(&pool).await.unwrap();
    pool
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "route_test_secret".to_string(),
        bcrypt_cost: 4,
        google_client_id: Some("test-client.apps.googleusercontent.com".to_string()),
        exchange_rate_api_key: Some("test-key".to_string()),
        ..AppConfig::default()
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<RwLock<AppState>>,
    pub currencies: Arc<MockCurrencySource>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let currencies = Arc::new(MockCurrencySource::new(&[
            "USD", "EUR", "GBP", "CHF", "AUD", "CAD",
        ]));
        // Stub servers listen on loopback; keep proxy settings out of the way
        let http = Client::builder().no_proxy().build().unwrap();
        let state = AppState::from_config(test_pool().await, http, &config, currencies.clone());
        let state = Arc::new(RwLock::new(state));

        Self {
            router: crate::build_router(state.clone()),
            state,
            currencies,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers a user and returns `(token, user_id)`
    pub async fn register(&self, username: &str) -> (String, String) {
        let (status, body) = self
            .request(
                Method::POST,
                "/register",
                None,
                Some(json!({
                    "email": format!("{}@example.com", username),
                    "username": username,
                    "password": TEST_PASSWORD,
                    "confirm_password": TEST_PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }
}
