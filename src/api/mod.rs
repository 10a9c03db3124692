// Axum web server layer

use axum::{
    error_handling::HandleErrorLayer,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;

pub mod handlers;
pub mod middleware;
pub mod responses;

use crate::auth::auth_middleware::{require_admin, require_token, AuthState};
use crate::auth::custom_header::{require_custom_header, CustomHeaderState};
use crate::auth::token::{JwtVerifier, TokenIssuer, TokenVerifier};
use crate::config::Config;
use crate::core::errors::ServiceError;
use crate::state::blob_store::InMemoryBlobStore;
use crate::state::document_store::InMemoryDocumentStore;

/// Application state containing all shared dependencies
///
/// Components are wrapped in Arc for shared ownership across async tasks.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub verifier: Arc<JwtVerifier>,
    pub issuer: Arc<TokenIssuer>,
    pub config: Arc<Config>,
}

impl AppState {
    /// State backed by empty in-memory stores
    pub fn new(config: Config) -> Self {
        Self {
            store: Arc::new(InMemoryDocumentStore::new()),
            blobs: Arc::new(InMemoryBlobStore::new()),
            verifier: Arc::new(JwtVerifier::from_config(&config)),
            issuer: Arc::new(TokenIssuer::from_config(&config)),
            config: Arc::new(config),
        }
    }

    /// Gate state using this app's verifier and fallback header list
    pub fn auth_state(&self) -> Arc<AuthState> {
        let verifier: Arc<dyn TokenVerifier> = self.verifier.clone();
        Arc::new(AuthState::new(verifier, &self.config.auth_fallback_headers))
    }

    pub fn custom_header_state(&self) -> Arc<CustomHeaderState> {
        Arc::new(CustomHeaderState::new(self.config.custom_header_value.clone()))
    }
}

/// Storage for the opaque resource documents the gate protects
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list(&self, collection: &str) -> Result<Vec<Value>, ServiceError>;
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, ServiceError>;
    async fn insert(&self, collection: &str, fields: Map<String, Value>) -> Result<Value, ServiceError>;
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Option<Value>, ServiceError>;
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, ServiceError>;
    async fn collections(&self) -> Result<Vec<String>, ServiceError>;
}

/// Body of an uploaded file; its metadata lives in the `files` collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Storage for uploaded file bodies, keyed by metadata document id
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, id: &str, blob: StoredBlob) -> Result<(), ServiceError>;
    async fn get(&self, id: &str) -> Result<Option<StoredBlob>, ServiceError>;
    async fn delete(&self, id: &str) -> Result<bool, ServiceError>;
}

/// Router with the default gate built from `app_state`
pub fn build_router(app_state: AppState) -> Router {
    let auth_state = app_state.auth_state();
    let header_state = app_state.custom_header_state();
    create_router(app_state, auth_state, header_state)
}

/// Create the Axum router with all routes and middleware
///
/// Route groups:
/// - public: `/health`, `/api/auth/refresh`
/// - bearer: `/api/auth/me`, `/api/auth/logout`, `/api/files[/:id]`,
///   `/api/:collection[/:id[/:related]]` (admin-owned collections need the admin role)
/// - admin: `/api/admin`, `/api/admin/dashboard`, `/api/admin/:collection[/:id]`
/// - device: `/api/telemetry` (custom header)
///
/// Layers (outermost first): CORS, tracing, body size limit, request timeout.
pub fn create_router(
    app_state: AppState,
    auth_state: Arc<AuthState>,
    header_state: Arc<CustomHeaderState>,
) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/auth/refresh", post(handlers::refresh_handler));

    let authenticated = Router::new()
        .route("/api/auth/me", get(handlers::me_handler))
        .route("/api/auth/logout", post(handlers::logout_handler))
        .route(
            "/api/files",
            get(handlers::list_files_handler).post(handlers::upload_file_handler),
        )
        .route(
            "/api/files/:id",
            get(handlers::download_file_handler).delete(handlers::delete_file_handler),
        )
        .route(
            "/api/:collection",
            get(handlers::list_handler).post(handlers::create_handler),
        )
        .route(
            "/api/:collection/:id",
            get(handlers::get_handler)
                .put(handlers::update_handler)
                .delete(handlers::delete_handler),
        )
        .route(
            "/api/:collection/:id/:related",
            get(handlers::list_related_handler).post(handlers::create_related_handler),
        )
        .route_layer(from_fn_with_state(auth_state.clone(), require_token));

    let admin = Router::new()
        .route("/api/admin", get(handlers::admin_overview_handler))
        .route("/api/admin/dashboard", get(handlers::dashboard_handler))
        .route(
            "/api/admin/:collection",
            get(handlers::list_handler).post(handlers::create_handler),
        )
        .route(
            "/api/admin/:collection/:id",
            get(handlers::get_handler)
                .put(handlers::update_handler)
                .delete(handlers::delete_handler),
        )
        .route_layer(from_fn_with_state(auth_state, require_admin));

    let device = Router::new()
        .route("/api/telemetry", post(handlers::ingest_telemetry_handler))
        .route_layer(from_fn_with_state(header_state, require_custom_header));

    let timeout_secs = app_state.config.request_timeout_secs;
    let body_limit = app_state.config.body_size_limit_bytes;

    let timeout_stack = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(middleware::handle_layer_error))
        .timeout(Duration::from_secs(timeout_secs))
        .into_inner();

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(admin)
        .merge(device)
        .layer(timeout_stack)
        .layer(middleware::body_size_limit_layer(body_limit))
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer())
        .with_state(app_state)
}
