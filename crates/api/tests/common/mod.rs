//! Shared helpers for router tests

#![allow(dead_code)]

use api::config::ServerConfig;
use api::{App, Server};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use storage::MemoryStorage;
use tower::ServiceExt;

pub struct TestApp {
    pub storage: Arc<MemoryStorage>,
    pub router: App,
}

/// App over fresh in-memory storage, rate limiting off
pub fn test_app() -> TestApp {
    let storage = Arc::new(MemoryStorage::new());
    let config = ServerConfig {
        rate_limit_per_minute: 0,
        ..ServerConfig::default()
    };
    let router = Server::new(storage.clone(), config).app().unwrap();
    TestApp { storage, router }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub async fn send_raw(router: &App, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
    TestResponse {
        status,
        content_type,
        body,
    }
}

pub async fn send(router: &App, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send_raw(router, request).await
}

/// Send `body` declared as `content_type`
pub async fn send_as(
    router: &App,
    method: Method,
    uri: &str,
    content_type: &str,
    body: &str,
) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    send_raw(router, request).await
}

/// Assert the `{"error_id", "error"}` envelope and return the message
pub fn error_message(response: &TestResponse) -> String {
    let json = response.json();
    assert!(json["error_id"].as_str().is_some_and(|id| !id.is_empty()));
    json["error"].as_str().unwrap().to_string()
}
