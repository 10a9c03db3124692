// Fixed-value header check for device ingestion routes

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::core::errors::GateError;

pub const CUSTOM_HEADER: &str = "x-custom-header";

#[derive(Debug, Clone)]
pub struct CustomHeaderState {
    expected: String,
}

impl CustomHeaderState {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    /// Constant-time equality against the expected literal
    pub fn matches(&self, headers: &HeaderMap) -> bool {
        headers
            .get(CUSTOM_HEADER)
            .map(|v| bool::from(v.as_bytes().ct_eq(self.expected.as_bytes())))
            .unwrap_or(false)
    }
}

/// Reject with 400 unless `X-Custom-Header` carries the expected value
pub async fn require_custom_header(
    State(state): State<Arc<CustomHeaderState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.matches(request.headers()) {
        warn!(path = %request.uri().path(), "Custom header check failed");
        return GateError::BadCustomHeader.into_response();
    }

    next.run(request).await
}
