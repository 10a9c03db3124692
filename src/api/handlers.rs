// Request handlers for API endpoints

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::api::responses::{ApiError, Envelope, HealthResponse};
use crate::api::{AppState, StoredBlob};
use crate::auth::token::TokenPair;
use crate::core::errors::{GateError, ServiceError};
use crate::core::models::{is_admin_collection, Claims};

/// Collection holding uploaded file metadata
pub const FILES_COLLECTION: &str = "files";

/// Multipart part that carries the uploaded file
pub const UPLOAD_FIELD: &str = "file";

/// Body of `POST /api/auth/refresh`
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Identity returned by `GET /api/auth/me`
#[derive(Debug, Serialize)]
pub struct Profile {
    pub id: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// GET /health
pub async fn health_handler(State(app_state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let collections = app_state.store.collections().await?.len();
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        collections,
    }))
}

/// POST /api/auth/refresh
///
/// Exchanges a refresh token for a new access/refresh pair. Refresh tokens
/// are never accepted by the bearer gate, so this route sits outside it.
pub async fn refresh_handler(
    State(app_state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<Envelope<TokenPair>>, ApiError> {
    let claims = app_state
        .verifier
        .verify_refresh(&request.refresh_token)
        .map_err(|e| {
            warn!(reason = %e, "Refresh token rejected");
            ApiError::from(e)
        })?;

    let pair = app_state
        .issuer
        .issue_pair(&claims.sub, &claims.role, claims.name.as_deref())?;

    info!(subject = %claims.sub, "Access token refreshed");
    Ok(Json(Envelope::ok(pair)))
}

/// GET /api/auth/me
pub async fn me_handler(Extension(claims): Extension<Claims>) -> Json<Envelope<Profile>> {
    Json(Envelope::ok(Profile {
        id: claims.sub,
        role: claims.role,
        name: claims.name,
    }))
}

/// POST /api/auth/logout
pub async fn logout_handler(Extension(claims): Extension<Claims>) -> Json<Envelope<Value>> {
    info!(subject = %claims.sub, "User logged out");
    Json(Envelope::with_message(Value::Null, "Logged out"))
}

/// GET /api/admin
pub async fn admin_overview_handler(
    State(app_state): State<AppState>,
) -> Result<Json<Envelope<Vec<String>>>, ApiError> {
    Ok(Json(Envelope::ok(app_state.store.collections().await?)))
}

/// GET /api/admin/dashboard
///
/// Document counts per top-level collection. Nested collections such as
/// `pigs/<id>/vaccinations` are not counted.
pub async fn dashboard_handler(
    State(app_state): State<AppState>,
) -> Result<Json<Envelope<Map<String, Value>>>, ApiError> {
    let mut stats = Map::new();
    for collection in app_state.store.collections().await? {
        if collection.contains('/') {
            continue;
        }
        let count = app_state.store.list(&collection).await?.len();
        stats.insert(collection, Value::from(count));
    }
    Ok(Json(Envelope::ok(stats)))
}

/// GET /api/:collection
pub async fn list_handler(
    State(app_state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(collection): Path<String>,
) -> Result<Json<Envelope<Vec<Value>>>, ApiError> {
    ensure_collection_access(&claims, &collection)?;
    Ok(Json(Envelope::ok(app_state.store.list(&collection).await?)))
}

/// POST /api/:collection
pub async fn create_handler(
    State(app_state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(collection): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Envelope<Value>>), ApiError> {
    ensure_collection_access(&claims, &collection)?;
    create_in(&app_state, &collection, body).await
}

/// GET /api/:collection/:id
pub async fn get_handler(
    State(app_state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    ensure_collection_access(&claims, &collection)?;
    let doc = app_state
        .store
        .get(&collection, &id)
        .await?
        .ok_or_else(|| ServiceError::NotFound {
            collection: collection.clone(),
            id: id.clone(),
        })?;
    Ok(Json(Envelope::ok(doc)))
}

/// PUT /api/:collection/:id
pub async fn update_handler(
    State(app_state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((collection, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    ensure_collection_access(&claims, &collection)?;
    let fields = into_fields(body)?;
    let doc = app_state
        .store
        .update(&collection, &id, fields)
        .await?
        .ok_or_else(|| ServiceError::NotFound {
            collection: collection.clone(),
            id: id.clone(),
        })?;
    Ok(Json(Envelope::ok(doc)))
}

/// DELETE /api/:collection/:id
pub async fn delete_handler(
    State(app_state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    ensure_collection_access(&claims, &collection)?;
    if !app_state.store.delete(&collection, &id).await? {
        return Err(ServiceError::NotFound { collection, id }.into());
    }
    Ok(Json(Envelope::with_message(Value::Null, "Deleted")))
}

/// GET /api/:collection/:id/:related
pub async fn list_related_handler(
    State(app_state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((collection, id, related)): Path<(String, String, String)>,
) -> Result<Json<Envelope<Vec<Value>>>, ApiError> {
    ensure_collection_access(&claims, &collection)?;
    let key = related_collection(&collection, &id, &related);
    Ok(Json(Envelope::ok(app_state.store.list(&key).await?)))
}

/// POST /api/:collection/:id/:related
pub async fn create_related_handler(
    State(app_state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((collection, id, related)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Envelope<Value>>), ApiError> {
    ensure_collection_access(&claims, &collection)?;
    let key = related_collection(&collection, &id, &related);
    create_in(&app_state, &key, body).await
}

/// POST /api/telemetry
///
/// Device-pushed readings, guarded by the custom header rather than a
/// bearer token. Readings land under `devices/<device_id>/telemetry`.
pub async fn ingest_telemetry_handler(
    State(app_state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Envelope<Value>>), ApiError> {
    let device_id = match body.get("device_id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(ServiceError::InvalidDocument("device_id is required".to_string()).into());
        }
    };

    let key = related_collection("devices", &device_id, "telemetry");
    create_in(&app_state, &key, body).await
}

/// GET /api/files
pub async fn list_files_handler(
    State(app_state): State<AppState>,
) -> Result<Json<Envelope<Vec<Value>>>, ApiError> {
    Ok(Json(Envelope::ok(app_state.store.list(FILES_COLLECTION).await?)))
}

/// POST /api/files (multipart/form-data)
///
/// Reads the `file` part, records its metadata in the `files` collection
/// and keeps the body in the blob store under the same id.
pub async fn upload_file_handler(
    State(app_state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Envelope<Value>>), ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!(error = %e, "Multipart parse failed");
        ServiceError::InvalidUpload(e.to_string())
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(sanitize_file_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServiceError::InvalidUpload(e.to_string()))?;
        upload = Some(StoredBlob {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }
    let blob = upload
        .ok_or_else(|| ServiceError::InvalidUpload(format!("missing '{}' part", UPLOAD_FIELD)))?;

    let mut fields = Map::new();
    fields.insert("file_name".to_string(), Value::from(blob.file_name.clone()));
    fields.insert("content_type".to_string(), Value::from(blob.content_type.clone()));
    fields.insert("size".to_string(), Value::from(blob.bytes.len()));
    fields.insert("uploaded_by".to_string(), Value::from(claims.sub.clone()));
    let doc = app_state.store.insert(FILES_COLLECTION, fields).await?;
    let id = doc
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ServiceError::StateError("stored file has no id".to_string()))?;

    let mut link = Map::new();
    link.insert("url".to_string(), Value::from(format!("/api/files/{}", id)));
    let doc = app_state
        .store
        .update(FILES_COLLECTION, &id, link)
        .await?
        .ok_or_else(|| ServiceError::StateError("stored file vanished".to_string()))?;

    info!(file_id = %id, size = blob.bytes.len(), subject = %claims.sub, "File uploaded");
    app_state.blobs.put(&id, blob).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(doc))))
}

/// GET /api/files/:id (binary body)
pub async fn download_file_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let blob = app_state
        .blobs
        .get(&id)
        .await?
        .ok_or_else(|| ServiceError::NotFound {
            collection: FILES_COLLECTION.to_string(),
            id: id.clone(),
        })?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, blob.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", blob.file_name),
            ),
        ],
        blob.bytes,
    )
        .into_response())
}

/// DELETE /api/files/:id
pub async fn delete_file_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let had_doc = app_state.store.delete(FILES_COLLECTION, &id).await?;
    let had_blob = app_state.blobs.delete(&id).await?;
    if !had_doc && !had_blob {
        return Err(ServiceError::NotFound {
            collection: FILES_COLLECTION.to_string(),
            id,
        }
        .into());
    }
    Ok(Json(Envelope::with_message(Value::Null, "Deleted")))
}

/// Refuse admin-owned collections to callers without the admin role
fn ensure_collection_access(claims: &Claims, collection: &str) -> Result<(), ServiceError> {
    if is_admin_collection(collection) && !claims.is_admin() {
        warn!(
            subject = %claims.sub,
            role = %claims.role,
            collection = collection,
            "Admin-owned collection refused"
        );
        return Err(GateError::Forbidden.into());
    }
    Ok(())
}

/// Last path component, with quotes that would break Content-Disposition swapped out
fn sanitize_file_name(raw: &str) -> String {
    raw.rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim()
        .replace('"', "'")
}

async fn create_in(
    app_state: &AppState,
    collection: &str,
    body: Value,
) -> Result<(StatusCode, Json<Envelope<Value>>), ApiError> {
    let fields = into_fields(body)?;
    let doc = app_state.store.insert(collection, fields).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(doc))))
}

fn into_fields(body: Value) -> Result<Map<String, Value>, ServiceError> {
    match body {
        Value::Object(fields) => Ok(fields),
        _ => Err(ServiceError::InvalidDocument("expected a JSON object".to_string())),
    }
}

/// Storage key for a collection nested under one document
pub fn related_collection(collection: &str, id: &str, related: &str) -> String {
    format!("{}/{}/{}", collection, id, related)
}
