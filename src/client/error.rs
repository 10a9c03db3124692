// API client error types

use thiserror::Error;

/// Result type for API client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the API client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server answered 401; the session has already been torn down
    #[error("Unauthenticated (HTTP 401)")]
    Unauthenticated { body: String },

    /// Server answered with any other non-success status
    #[error("Request failed with HTTP {status}")]
    Status { status: u16, body: String },

    /// No response within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Connection or protocol failure before a status was received
    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Request body could not be encoded
    #[error("Failed to encode request: {0}")]
    Encode(String),

    /// Response body could not be decoded into the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The operation needs session state that is not present
    #[error("Not logged in: {0}")]
    NotLoggedIn(String),

    /// Persisted session could not be read or written
    #[error("Session storage error: {0}")]
    Session(String),

    /// Client could not be built
    #[error("Client configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Classify a reqwest failure
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err)
        } else {
            ClientError::Transport(err)
        }
    }

    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthenticated { .. } => Some(401),
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body, when the server answered
    pub fn body(&self) -> Option<&str> {
        match self {
            ClientError::Unauthenticated { body } | ClientError::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Network failure, timeout or 5xx: nothing the caller did wrong
    pub fn is_upstream_failure(&self) -> bool {
        match self {
            ClientError::Timeout(_) | ClientError::Transport(_) => true,
            ClientError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
