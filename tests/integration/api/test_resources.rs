// Integration tests for the resource routes behind the gate

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::common::{self, body_json, request, test_state};

#[tokio::test]
async fn test_create_get_update_delete() {
    let app = herd_gate::api::build_router(test_state());
    let token = common::farmer_token();

    let created = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/pigs",
            Some(&token),
            Some(json!({"name": "Babe", "breed": "Yorkshire"})),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = body_json(created).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let fetched = app
        .clone()
        .oneshot(request(Method::GET, &format!("/api/pigs/{}", id), Some(&token), None))
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(body_json(fetched).await["data"], created["data"]);

    let updated = app
        .clone()
        .oneshot(request(
            Method::PUT,
            &format!("/api/pigs/{}", id),
            Some(&token),
            Some(json!({"weight_kg": 82.5})),
        ))
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);
    let updated = body_json(updated).await;
    assert_eq!(updated["data"]["name"], "Babe");
    assert_eq!(updated["data"]["weight_kg"], 82.5);

    let deleted = app
        .clone()
        .oneshot(request(Method::DELETE, &format!("/api/pigs/{}", id), Some(&token), None))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);

    let gone = app
        .oneshot(request(Method::GET, &format!("/api/pigs/{}", id), Some(&token), None))
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(gone).await,
        json!({"success": false, "message": "Resource not found"})
    );
}

#[tokio::test]
async fn test_nested_collection() {
    let app = herd_gate::api::build_router(test_state());
    let token = common::farmer_token();

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/pigs/7/vaccinations",
            Some(&token),
            Some(json!({"vaccine": "PCV2"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let listed = app
        .clone()
        .oneshot(request(Method::GET, "/api/pigs/7/vaccinations", Some(&token), None))
        .await
        .unwrap();
    let listed = body_json(listed).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    assert_eq!(listed["data"][0]["vaccine"], "PCV2");

    let other = app
        .oneshot(request(Method::GET, "/api/pigs/8/vaccinations", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(body_json(other).await["data"], json!([]));
}

#[tokio::test]
async fn test_non_object_body_is_422() {
    let app = herd_gate::api::build_router(test_state());
    let response = app
        .oneshot(request(
            Method::POST,
            "/api/pigs",
            Some(&common::farmer_token()),
            Some(json!(["not", "an", "object"])),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_farmer_cannot_edit_admin_owned_users() {
    let app = herd_gate::api::build_router(test_state());
    let admin = common::admin_token();
    let farmer = common::farmer_token();

    let created = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/admin/users",
            Some(&admin),
            Some(json!({"name": "bob", "role": "farmer"})),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let id = body_json(created).await["data"]["id"].as_str().unwrap().to_string();

    let escalated = app
        .clone()
        .oneshot(request(
            Method::PUT,
            &format!("/api/users/{}", id),
            Some(&farmer),
            Some(json!({"role": "admin"})),
        ))
        .await
        .unwrap();
    assert_eq!(escalated.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(escalated).await,
        json!({"success": false, "message": "Access denied. Admins only."})
    );

    for (method, uri) in [
        (Method::GET, "/api/users".to_string()),
        (Method::GET, format!("/api/users/{}", id)),
        (Method::DELETE, format!("/api/users/{}", id)),
        (Method::GET, format!("/api/users/{}/notes", id)),
    ] {
        let response = app
            .clone()
            .oneshot(request(method, &uri, Some(&farmer), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
    }

    let fetched = app
        .oneshot(request(
            Method::GET,
            &format!("/api/admin/users/{}", id),
            Some(&admin),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(fetched).await["data"]["role"], "farmer");
}

#[tokio::test]
async fn test_admin_may_use_bearer_routes_for_users() {
    let app = herd_gate::api::build_router(test_state());
    let response = app
        .oneshot(request(Method::GET, "/api/users", Some(&common::admin_token()), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_reports_filed_by_farmers_reach_admins() {
    let app = herd_gate::api::build_router(test_state());

    let filed = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/reports",
            Some(&common::farmer_token()),
            Some(json!({"post_id": "p-1", "reason": "spam"})),
        ))
        .await
        .unwrap();
    assert_eq!(filed.status(), StatusCode::CREATED);

    let listed = app
        .oneshot(request(
            Method::GET,
            "/api/admin/reports",
            Some(&common::admin_token()),
            None,
        ))
        .await
        .unwrap();
    let listed = body_json(listed).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    assert_eq!(listed["data"][0]["post_id"], "p-1");
}

#[tokio::test]
async fn test_dashboard_counts_top_level_collections() {
    let app = herd_gate::api::build_router(test_state());
    let farmer = common::farmer_token();

    for (uri, body) in [
        ("/api/pigs", json!({"name": "Babe"})),
        ("/api/pigs", json!({"name": "Wilbur"})),
        ("/api/pigs/1/vaccinations", json!({"vaccine": "PCV2"})),
        ("/api/devices", json!({"serial_number": "D-1"})),
    ] {
        app.clone()
            .oneshot(request(Method::POST, uri, Some(&farmer), Some(body)))
            .await
            .unwrap();
    }

    let denied = app
        .clone()
        .oneshot(request(Method::GET, "/api/admin/dashboard", Some(&farmer), None))
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let stats = app
        .oneshot(request(
            Method::GET,
            "/api/admin/dashboard",
            Some(&common::admin_token()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(stats.status(), StatusCode::OK);
    assert_eq!(body_json(stats).await["data"], json!({"devices": 1, "pigs": 2}));
}

const BOUNDARY: &str = "herd-gate-boundary";

fn multipart_request(token: &str, field: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"{n}\"\r\nContent-Type: image/png\r\n\r\n",
        b = BOUNDARY,
        f = field,
        n = file_name
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/files")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_then_download_file() {
    let app = herd_gate::api::build_router(test_state());
    let token = common::farmer_token();

    let uploaded = app
        .clone()
        .oneshot(multipart_request(&token, "file", "scan.png", b"\x89PNG-DATA"))
        .await
        .unwrap();
    assert_eq!(uploaded.status(), StatusCode::CREATED);
    let uploaded = body_json(uploaded).await;
    let id = uploaded["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(uploaded["data"]["file_name"], "scan.png");
    assert_eq!(uploaded["data"]["size"], 9);
    assert_eq!(uploaded["data"]["url"], format!("/api/files/{}", id));

    let downloaded = app
        .clone()
        .oneshot(request(Method::GET, &format!("/api/files/{}", id), Some(&token), None))
        .await
        .unwrap();
    assert_eq!(downloaded.status(), StatusCode::OK);
    assert_eq!(downloaded.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = axum::body::to_bytes(downloaded.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"\x89PNG-DATA");

    let deleted = app
        .clone()
        .oneshot(request(Method::DELETE, &format!("/api/files/{}", id), Some(&token), None))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);

    let gone = app
        .oneshot(request(Method::GET, &format!("/api/files/{}", id), Some(&token), None))
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_without_file_part_is_400() {
    let app = herd_gate::api::build_router(test_state());
    let response = app
        .oneshot(multipart_request(
            &common::farmer_token(),
            "attachment",
            "scan.png",
            b"PNG",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_requires_token() {
    let app = herd_gate::api::build_router(test_state());
    let mut req = multipart_request("ignored", "file", "scan.png", b"PNG");
    req.headers_mut().remove(header::AUTHORIZATION);
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
