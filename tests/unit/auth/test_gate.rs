// Unit tests for the token gate decision

use herd_gate::auth::decision::{check_request, extract_bearer};
use herd_gate::auth::token::{JwtVerifier, TokenVerifier};
use herd_gate::config::Config;
use herd_gate::core::errors::GateError;
use herd_gate::core::models::{Claims, RouteAccess, TokenKind};

use crate::common;

fn verifier() -> JwtVerifier {
    JwtVerifier::from_config(&Config::test_config())
}

fn header(token: &str) -> String {
    format!("Bearer {}", token)
}

#[test]
fn test_missing_header_is_missing_token() {
    let result = check_request(None, &verifier(), RouteAccess::Authenticated);
    assert_eq!(result.unwrap_err(), GateError::MissingToken);
}

#[test]
fn test_wrong_scheme_is_missing_token() {
    let result = check_request(Some("Basic abc"), &verifier(), RouteAccess::Authenticated);
    assert_eq!(result.unwrap_err(), GateError::MissingToken);
}

#[test]
fn test_garbage_token_is_invalid() {
    let result = check_request(Some("Bearer not.a.jwt"), &verifier(), RouteAccess::Authenticated);
    assert_eq!(result.unwrap_err(), GateError::InvalidToken);
}

#[test]
fn test_expired_token_is_invalid() {
    let now = chrono::Utc::now().timestamp();
    let token = common::issuer()
        .sign(&Claims {
            sub: "farmer-1".to_string(),
            role: "farmer".to_string(),
            exp: now - 3600,
            iat: Some(now - 7200),
            jti: None,
            iss: None,
            name: None,
            typ: TokenKind::Access,
        })
        .unwrap();

    let result = check_request(Some(&header(&token)), &verifier(), RouteAccess::Authenticated);
    assert_eq!(result.unwrap_err(), GateError::InvalidToken);
}

#[test]
fn test_farmer_passes_bearer_gate_but_not_admin_gate() {
    let token = common::farmer_token();

    let claims = check_request(Some(&header(&token)), &verifier(), RouteAccess::Authenticated).unwrap();
    assert_eq!(claims.sub, "farmer-1");
    assert_eq!(claims.role, "farmer");

    let result = check_request(Some(&header(&token)), &verifier(), RouteAccess::AdminOnly);
    assert_eq!(result.unwrap_err(), GateError::Forbidden);
}

#[test]
fn test_admin_passes_admin_gate() {
    let token = common::admin_token();
    let claims = check_request(Some(&header(&token)), &verifier(), RouteAccess::AdminOnly).unwrap();
    assert!(claims.is_admin());
}

#[test]
fn test_role_match_is_exact() {
    let token = common::access_token("u", "Admin");
    let result = check_request(Some(&header(&token)), &verifier(), RouteAccess::AdminOnly);
    assert_eq!(result.unwrap_err(), GateError::Forbidden);
}

#[test]
fn test_refresh_token_rejected_as_access_token() {
    let refresh = common::issuer()
        .issue("farmer-1", "farmer", None, TokenKind::Refresh)
        .unwrap();
    assert_eq!(verifier().verify(&refresh).unwrap_err(), GateError::InvalidToken);
    assert!(verifier().verify_refresh(&refresh).is_ok());
}

#[test]
fn test_extract_bearer_variants() {
    assert_eq!(extract_bearer(Some("Bearer abc")), Some("abc"));
    assert_eq!(extract_bearer(Some("bearer abc")), Some("abc"));
    assert_eq!(extract_bearer(Some("Bearer")), None);
    assert_eq!(extract_bearer(Some("Bearer a b")), None);
    assert_eq!(extract_bearer(Some("")), None);
    assert_eq!(extract_bearer(None), None);
}
