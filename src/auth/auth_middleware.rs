// Axum authentication middleware

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderName},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::audit_logger::{AuditLogger, GateEvent, RequestOrigin};
use crate::auth::decision::{check_request, extract_bearer};
use crate::auth::token::{TokenFingerprint, TokenVerifier};
use crate::core::models::RouteAccess;

/// Authentication state shared by every gated route
#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub audit_logger: Arc<AuditLogger>,
    pub fallback_headers: Vec<HeaderName>,
}

impl AuthState {
    /// Build the gate state; unparsable fallback header names are skipped
    pub fn new(verifier: Arc<dyn TokenVerifier>, fallback_headers: &[String]) -> Self {
        let fallback_headers = fallback_headers
            .iter()
            .filter_map(|name| match HeaderName::from_bytes(name.as_bytes()) {
                Ok(header) => Some(header),
                Err(e) => {
                    warn!(header = %name, error = %e, "Ignoring invalid fallback header name");
                    None
                }
            })
            .collect();

        Self {
            verifier,
            audit_logger: Arc::new(AuditLogger::new()),
            fallback_headers,
        }
    }
}

/// Gate for routes that need any verified bearer token
pub async fn require_token(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    gate(&auth_state, request, next, RouteAccess::Authenticated).await
}

/// Gate for admin routes: verified bearer token with role "admin"
pub async fn require_admin(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    gate(&auth_state, request, next, RouteAccess::AdminOnly).await
}

async fn gate(auth_state: &AuthState, mut request: Request, next: Next, access: RouteAccess) -> Response {
    // 1. Move a misplaced authorization value into the canonical header
    if normalize_authorization(request.headers_mut(), &auth_state.fallback_headers) {
        debug!("Authorization header restored from fallback slot");
    }

    let origin = request_origin(&request);
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let fingerprint = extract_bearer(authorization.as_deref()).map(TokenFingerprint::of);

    // 2-4. Presence, validity, role
    match check_request(authorization.as_deref(), auth_state.verifier.as_ref(), access) {
        Ok(claims) => {
            auth_state.audit_logger.log_gate_event(
                &GateEvent::Forwarded {
                    subject: claims.sub.clone(),
                    role: claims.role.clone(),
                },
                fingerprint.as_ref(),
                &origin,
            );

            // 5. Forward unchanged; claims ride along in extensions
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(reason) => {
            auth_state.audit_logger.log_gate_event(
                &GateEvent::Rejected {
                    reason: reason.clone(),
                },
                fingerprint.as_ref(),
                &origin,
            );
            reason.into_response()
        }
    }
}

/// Copy the first non-empty fallback header into `Authorization`
///
/// Only acts when the canonical header is absent or blank. Returns true
/// when a value was copied.
pub fn normalize_authorization(headers: &mut HeaderMap, fallbacks: &[HeaderName]) -> bool {
    if headers.get(AUTHORIZATION).is_some_and(|v| !is_blank(v.as_bytes())) {
        return false;
    }

    let restored = fallbacks
        .iter()
        .filter_map(|name| headers.get(name))
        .find(|v| !is_blank(v.as_bytes()))
        .cloned();

    match restored {
        Some(value) => {
            headers.insert(AUTHORIZATION, value);
            true
        }
        None => false,
    }
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| b.is_ascii_whitespace())
}

fn request_origin(request: &Request) -> RequestOrigin {
    RequestOrigin {
        path: request.uri().path().to_string(),
        ip_address: extract_ip_address(request.headers()),
        user_agent: request
            .headers()
            .get("User-Agent")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
    }
}

/// Checks `X-Forwarded-For` first (for proxied requests), then `X-Real-IP`.
fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    headers
        .get("X-Forwarded-For")
        .or_else(|| headers.get("X-Real-IP"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
