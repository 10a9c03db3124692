// HTTP client for the livestock API with session-aware interceptors

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use super::error::{ClientError, ClientResult};
use super::interceptors::{
    BearerAuth, Navigator, RequestInterceptor, ResponseInterceptor, SessionExpiry,
};
use super::session::Session;

/// Body attached to an outgoing request
enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// HTTP client bound to one resource group base URL
///
/// Every request passes through the request interceptors (bearer token)
/// and every response status through the response interceptors (401
/// session teardown). There is no retry and no backoff.
#[derive(Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: String,
    timeout: Duration,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl ApiClient {
    /// Create a client with the standard bearer and session-expiry interceptors
    ///
    /// # Arguments
    /// * `base_url` - Resource group base URL, e.g. `http://host/api/admin`
    /// * `timeout` - Whole-request timeout
    /// * `session` - Shared session the interceptors read and clear
    /// * `navigator` - Receives `/login` when a 401 ends the session
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Session,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        let client = Self::bare(base_url, timeout)?
            .with_request_interceptor(Arc::new(BearerAuth::new(session.clone())))
            .with_response_interceptor(Arc::new(SessionExpiry::new(session, navigator)));
        Ok(client)
    }

    /// Create a client with no interceptors installed
    pub fn bare(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let parsed = url::Url::parse(base_url).map_err(|e| {
            ClientError::Configuration(format!("Invalid base URL '{}': {}", base_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Configuration(format!(
                "Base URL must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .pool_idle_timeout(Duration::from_secs(90))
            .default_headers(default_headers)
            .build()
            .map_err(|e| {
                ClientError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
        })
    }

    pub fn with_request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_interceptors.push(interceptor);
        self
    }

    pub fn with_response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_interceptors.push(interceptor);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path relative to the base URL
    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn get(&self, path: &str) -> ClientResult<Value> {
        let response = self.execute(Method::GET, path, RequestBody::Empty).await?;
        read_json(response).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<Value> {
        let body = encode(body)?;
        let response = self.execute(Method::POST, path, RequestBody::Json(body)).await?;
        read_json(response).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<Value> {
        let body = encode(body)?;
        let response = self.execute(Method::PUT, path, RequestBody::Json(body)).await?;
        read_json(response).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<Value> {
        let body = encode(body)?;
        let response = self.execute(Method::PATCH, path, RequestBody::Json(body)).await?;
        read_json(response).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<Value> {
        let response = self.execute(Method::DELETE, path, RequestBody::Empty).await?;
        read_json(response).await
    }

    /// POST a multipart form; reqwest sets the boundary content type
    pub async fn upload(&self, path: &str, form: Form) -> ClientResult<Value> {
        let response = self
            .execute(Method::POST, path, RequestBody::Multipart(form))
            .await?;
        read_json(response).await
    }

    /// GET raw bytes
    pub async fn download(&self, path: &str) -> ClientResult<Vec<u8>> {
        let response = self.execute(Method::GET, path, RequestBody::Empty).await?;
        let bytes = response.bytes().await.map_err(ClientError::from_transport)?;
        Ok(bytes.to_vec())
    }

    /// Send one request through the interceptors and check its status
    async fn execute(&self, method: Method, path: &str, body: RequestBody) -> ClientResult<Response> {
        let url = self.url(path);

        let mut request = self.http_client.request(method.clone(), &url);
        request = match body {
            RequestBody::Empty => request.header(CONTENT_TYPE, "application/json"),
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };
        for interceptor in &self.request_interceptors {
            request = interceptor.intercept(request);
        }

        debug!(method = %method, url = %url, "Sending API request");

        let response = request.send().await.map_err(|e| {
            let err = ClientError::from_transport(e);
            if matches!(err, ClientError::Timeout(_)) {
                error!(url = %url, timeout_secs = self.timeout.as_secs(), "API request timed out");
            }
            err
        })?;

        let status = response.status();
        for interceptor in &self.response_interceptors {
            interceptor.on_response(status, &url);
        }

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            Err(ClientError::Unauthenticated { body })
        } else {
            Err(ClientError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> ClientResult<Value> {
    serde_json::to_value(body).map_err(|e| ClientError::Encode(e.to_string()))
}

/// Parse a success body; an empty body reads as `null`
async fn read_json(response: Response) -> ClientResult<Value> {
    let text = response.text().await.map_err(ClientError::from_transport)?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
}
