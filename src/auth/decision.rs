// Gate decision logic, independent of the HTTP request type

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::error;

use crate::auth::token::TokenVerifier;
use crate::core::errors::GateError;
use crate::core::models::{AuthDecision, Claims, RouteAccess};

/// Role check on already-verified claims
pub fn authorize(claims: Claims, access: RouteAccess) -> AuthDecision {
    match access {
        RouteAccess::Authenticated => AuthDecision::Authenticated(claims),
        RouteAccess::AdminOnly if claims.is_admin() => AuthDecision::Authorized(claims),
        RouteAccess::AdminOnly => AuthDecision::Forbidden,
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value
///
/// The scheme is matched case-insensitively; anything other than exactly
/// one non-empty token after it counts as no token.
pub fn extract_bearer(header_value: Option<&str>) -> Option<&str> {
    let mut parts = header_value?.split_whitespace();
    let scheme = parts.next()?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    Some(token)
}

/// Run steps 2-4 of the gate: presence, validity, role
///
/// Any panic raised by the verifier is caught here and turned into
/// `GateError::Internal` carrying the panic message.
pub fn check_request(
    authorization: Option<&str>,
    verifier: &dyn TokenVerifier,
    access: RouteAccess,
) -> Result<Claims, GateError> {
    let token = extract_bearer(authorization).ok_or(GateError::MissingToken)?;

    let claims = match catch_unwind(AssertUnwindSafe(|| verifier.verify(token))) {
        Ok(result) => result?,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(error = %message, "Token verification crashed");
            return Err(GateError::Internal(message));
        }
    };

    match authorize(claims, access) {
        AuthDecision::Authenticated(claims) | AuthDecision::Authorized(claims) => Ok(claims),
        AuthDecision::Forbidden => Err(GateError::Forbidden),
        AuthDecision::Unauthenticated => Err(GateError::InvalidToken),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Token verification failed".to_string()
    }
}
