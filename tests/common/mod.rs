#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use devhub::{app, settings::DEFAULT_BODY_LIMIT, AppState, MemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;

pub fn test_app() -> Router {
    app(AppState::new(MemoryStore::new()), DEFAULT_BODY_LIMIT)
}

/// Send one request; the body is parsed as JSON, or `Value::Null` when empty.
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request");

    let resp = app.clone().oneshot(request).await.expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body was not JSON")
    };
    (status, value)
}

pub async fn create_developer(app: &Router, name: &str, email: &str) -> Value {
    let (status, body) = send(app, "POST", "/developers", Some(json!({"name": name, "email": email}))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

pub async fn create_project(app: &Router, developer_id: i64, name: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/projects",
        Some(json!({
            "name": name,
            "description": "A project",
            "estimatedTime": "2 days",
            "repository": "https://example.com/repo",
            "startDate": "2023-01-02",
            "developerId": developer_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

/// Send a raw body with no content type.
pub async fn send_raw(app: &Router, method: &str, uri: &str, body: &'static str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body))
        .expect("failed to build request");
    let resp = app.clone().oneshot(request).await.expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}
