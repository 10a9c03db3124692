// Common test utilities and helpers for all test modules
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use herd_gate::api::{build_router, AppState};
use herd_gate::auth::token::TokenIssuer;
use herd_gate::config::Config;
use herd_gate::core::models::TokenKind;
use serde_json::Value;

pub const CUSTOM_HEADER_VALUE: &str = "herd-device";

pub fn test_state() -> AppState {
    AppState::new(Config::test_config())
}

pub fn issuer() -> TokenIssuer {
    TokenIssuer::from_config(&Config::test_config())
}

pub fn access_token(subject: &str, role: &str) -> String {
    issuer()
        .issue(subject, role, Some("Test User"), TokenKind::Access)
        .unwrap()
}

pub fn farmer_token() -> String {
    access_token("farmer-1", "farmer")
}

pub fn admin_token() -> String {
    access_token("admin-1", "admin")
}

/// Request with an optional bearer token and JSON body
pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Serve the real router on an ephemeral port; returns the API base URL
pub async fn spawn_server(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_router(state);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/api", addr)
}
