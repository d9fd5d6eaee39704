//! Shared helpers for router-level integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use communitas_backend::{config::Config, server};
use serde_json::Value;
use tempfile::NamedTempFile;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@communitas.local";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Build the full router against a throwaway database. The temp file must
/// stay alive for the duration of the test.
pub fn setup() -> (Router, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let config = Config {
        database_path: temp_file.path().to_str().unwrap().to_string(),
        port: 0,
        jwt_secret: "integration-test-secret-key".to_string(),
        token_ttl_hours: 1,
        seed_sample_data: false,
    };
    let state = server::build_state(&config).unwrap();
    (server::build_router(state), temp_file)
}

/// Fire one request and return (status, parsed JSON body). Bodies that are
/// empty (e.g. 204 responses) come back as `Value::Null`.
pub async fn send(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

pub async fn register(app: &Router, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({ "name": name, "email": email, "password": password })),
    )
    .await
}

/// Log in and return the bearer token; panics on failure so tests read
/// cleanly.
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}
