// Per-resource call functions grouped by API area

use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

pub mod admin;
pub mod auth;
pub mod chat;
pub mod community;
pub mod devices;
pub mod files;
pub mod pigs;
pub mod vet;

pub use admin::AdminService;
pub use auth::AuthService;
pub use chat::ChatService;
pub use community::CommunityService;
pub use devices::DeviceService;
pub use files::FileService;
pub use pigs::PigService;
pub use vet::VetService;

use super::api_client::ApiClient;
use super::error::{ClientError, ClientResult};
use super::interceptors::Navigator;
use super::payload::{decode_items, extract_collection, unwrap_data};
use super::session::Session;
use crate::config::Config;

/// One service per resource group, all sharing a session
#[derive(Debug, Clone)]
pub struct ApiClients {
    pub auth: AuthService,
    pub pigs: PigService,
    pub devices: DeviceService,
    pub vet: VetService,
    pub admin: AdminService,
    pub chat: ChatService,
    pub community: CommunityService,
    pub files: FileService,
}

impl ApiClients {
    /// Build every group client under `api_base_url`
    pub fn new(
        api_base_url: &str,
        timeout: Duration,
        session: Session,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        let base = api_base_url.trim_end_matches('/');
        let group = |prefix: &str| -> ClientResult<ApiClient> {
            let url = if prefix.is_empty() {
                base.to_string()
            } else {
                format!("{}/{}", base, prefix)
            };
            ApiClient::new(&url, timeout, session.clone(), navigator.clone())
        };

        Ok(Self {
            auth: AuthService::new(group("auth")?, session.clone()),
            pigs: PigService::new(group("")?),
            devices: DeviceService::new(group("")?),
            vet: VetService::new(group("")?),
            admin: AdminService::new(group("admin")?),
            chat: ChatService::new(group("")?),
            community: CommunityService::new(group("")?),
            files: FileService::new(group("files")?),
        })
    }

    pub fn from_config(
        config: &Config,
        session: Session,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        Self::new(
            &config.api_base_url,
            Duration::from_secs(config.client_timeout_secs),
            session,
            navigator,
        )
    }
}

/// Log a failed call with whatever the server told us
pub(crate) fn log_failure(operation: &str, err: &ClientError) {
    error!(
        operation = operation,
        error = %err,
        status = ?err.status(),
        response_body = err.body().unwrap_or(""),
        "API call failed"
    );
}

/// Log and pass the error through unchanged
pub(crate) fn reraise<T>(operation: &str, result: ClientResult<T>) -> ClientResult<T> {
    if let Err(ref e) = result {
        log_failure(operation, e);
    }
    result
}

/// GET a collection; any failure reads as an empty list
pub(crate) async fn fetch_list<T: DeserializeOwned>(
    client: &ApiClient,
    path: &str,
    field: Option<&str>,
    operation: &str,
) -> Vec<T> {
    match client.get(path).await {
        Ok(payload) => decode_items(extract_collection(payload, field), operation),
        Err(e) => {
            log_failure(operation, &e);
            Vec::new()
        }
    }
}

/// Decode a single record, unwrapping a `data` envelope
pub(crate) fn decode_record<T: DeserializeOwned>(payload: serde_json::Value) -> ClientResult<T> {
    serde_json::from_value(unwrap_data(payload)).map_err(|e| ClientError::Decode(e.to_string()))
}
