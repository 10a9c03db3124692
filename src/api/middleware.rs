// Middleware stack for observability and protection

use axum::{http::StatusCode, BoxError};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Request/response tracing (method, path, status, latency)
pub fn tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

/// Returns 413 Payload Too Large when the body exceeds `limit_bytes`
pub fn body_size_limit_layer(limit_bytes: usize) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(limit_bytes)
}

/// The browser frontend is served from another origin and sends bearer tokens
pub fn cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Convert errors raised by tower layers (timeout) into HTTP responses
pub async fn handle_layer_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}
