// Integration tests for the gate as mounted on the router

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use herd_gate::api::{create_router, AppState};
use herd_gate::auth::auth_middleware::AuthState;
use herd_gate::auth::token::TokenVerifier;
use herd_gate::config::Config;
use herd_gate::core::errors::GateError;
use herd_gate::core::models::{Claims, TokenKind};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::common::{self, body_json, request, test_state};

struct PanickingVerifier;

impl TokenVerifier for PanickingVerifier {
    fn verify(&self, _token: &str) -> Result<Claims, GateError> {
        panic!("key store unavailable");
    }
}

#[tokio::test]
async fn test_no_token_is_401() {
    let app = herd_gate::api::build_router(test_state());
    let response = app
        .oneshot(request(Method::GET, "/api/pigs", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body, json!({"success": false, "message": "No token provided"}));
}

#[tokio::test]
async fn test_invalid_token_is_401() {
    let app = herd_gate::api::build_router(test_state());
    let response = app
        .oneshot(request(Method::GET, "/api/pigs", Some("garbage"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body, json!({"success": false, "message": "Invalid token"}));
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_401() {
    let mut config = Config::test_config();
    config.jwt_secret = secrecy::Secret::new("a-completely-different-secret".to_string());
    let foreign = herd_gate::auth::token::TokenIssuer::from_config(&config)
        .issue("farmer-1", "farmer", None, TokenKind::Access)
        .unwrap();

    let app = herd_gate::api::build_router(test_state());
    let response = app
        .oneshot(request(Method::GET, "/api/pigs", Some(&foreign), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revoked_token_is_401() {
    let mut config = Config::test_config();
    config.revoked_token_ids = vec!["revoked-jti".to_string()];

    let now = chrono::Utc::now().timestamp();
    let token = common::issuer()
        .sign(&Claims {
            sub: "farmer-1".to_string(),
            role: "farmer".to_string(),
            exp: now + 600,
            iat: Some(now),
            jti: Some("revoked-jti".to_string()),
            iss: None,
            name: None,
            typ: TokenKind::Access,
        })
        .unwrap();

    let app = herd_gate::api::build_router(AppState::new(config));
    let response = app
        .oneshot(request(Method::GET, "/api/pigs", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Invalid token");
}

#[tokio::test]
async fn test_valid_token_is_forwarded() {
    let app = herd_gate::api::build_router(test_state());
    let response = app
        .oneshot(request(Method::GET, "/api/pigs", Some(&common::farmer_token()), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"success": true, "data": []}));
}

#[tokio::test]
async fn test_non_admin_on_admin_route_is_403() {
    let app = herd_gate::api::build_router(test_state());
    let response = app
        .oneshot(request(Method::GET, "/api/admin/users", Some(&common::farmer_token()), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await,
        json!({"success": false, "message": "Access denied. Admins only."})
    );
}

#[tokio::test]
async fn test_admin_on_admin_route_is_forwarded() {
    let app = herd_gate::api::build_router(test_state());
    let response = app
        .oneshot(request(Method::GET, "/api/admin/users", Some(&common::admin_token()), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);
}

#[tokio::test]
async fn test_admin_route_without_token_is_401_not_403() {
    let app = herd_gate::api::build_router(test_state());
    let response = app
        .oneshot(request(Method::GET, "/api/admin", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_fallback_header_is_normalized() {
    let app = herd_gate::api::build_router(test_state());
    let req = Request::builder()
        .method(Method::GET)
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, "")
        .header("x-forwarded-authorization", format!("Bearer {}", common::farmer_token()))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["id"], "farmer-1");
    assert_eq!(body["data"]["role"], "farmer");
}

#[tokio::test]
async fn test_verifier_panic_becomes_401() {
    let state = test_state();
    let verifier: Arc<dyn TokenVerifier> = Arc::new(PanickingVerifier);
    let auth_state = Arc::new(AuthState::new(verifier, &state.config.auth_fallback_headers));
    let header_state = state.custom_header_state();
    let app = create_router(state, auth_state, header_state);

    let response = app
        .oneshot(request(Method::GET, "/api/pigs", Some("anything"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        json!({"success": false, "message": "key store unavailable"})
    );
}

#[tokio::test]
async fn test_custom_header_gate() {
    let app = herd_gate::api::build_router(test_state());
    let reading = json!({"device_id": "collar-9", "temperature": 39.1});

    let missing = app
        .clone()
        .oneshot(request(Method::POST, "/api/telemetry", None, Some(reading.clone())))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(missing).await,
        json!({"message": "Invalid or missing X-Custom-Header."})
    );

    let wrong = Request::builder()
        .method(Method::POST)
        .uri("/api/telemetry")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Custom-Header", "not-the-device")
        .body(Body::from(reading.to_string()))
        .unwrap();
    assert_eq!(app.clone().oneshot(wrong).await.unwrap().status(), StatusCode::BAD_REQUEST);

    let good = Request::builder()
        .method(Method::POST)
        .uri("/api/telemetry")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Custom-Header", common::CUSTOM_HEADER_VALUE)
        .body(Body::from(reading.to_string()))
        .unwrap();
    let response = app.oneshot(good).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["device_id"], "collar-9");
}

#[tokio::test]
async fn test_refresh_issues_working_access_token() {
    let state = test_state();
    let refresh = common::issuer()
        .issue("farmer-1", "farmer", Some("Ada"), TokenKind::Refresh)
        .unwrap();

    let app = herd_gate::api::build_router(state);

    // a refresh token is not a bearer credential
    let rejected = app
        .clone()
        .oneshot(request(Method::GET, "/api/auth/me", Some(&refresh), None))
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({"refresh_token": refresh})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert!(body["data"]["refresh_token"].is_string());

    let me = app
        .oneshot(request(Method::GET, "/api/auth/me", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(me.status(), StatusCode::OK);
    let me = body_json(me).await;
    assert_eq!(me["data"]["id"], "farmer-1");
    assert_eq!(me["data"]["name"], "Ada");
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let app = herd_gate::api::build_router(test_state());
    let response = app
        .oneshot(request(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({"refresh_token": common::farmer_token()})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = herd_gate::api::build_router(test_state());
    let response = app
        .oneshot(request(Method::GET, "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}
