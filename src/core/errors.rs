// Domain error types - gate rejections never leak verification internals

use thiserror::Error;

/// Rejection raised by the request gate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// No bearer token attached (HTTP 401)
    #[error("No token provided")]
    MissingToken,

    /// Token failed verification: expired, malformed, bad signature or revoked (HTTP 401)
    #[error("Invalid token")]
    InvalidToken,

    /// Valid token without the admin role on an admin route (HTTP 403)
    #[error("Access denied. Admins only.")]
    Forbidden,

    /// Unexpected failure while checking the token (HTTP 401, message preserved)
    #[error("{0}")]
    Internal(String),

    /// Custom header missing or wrong (HTTP 400)
    #[error("Invalid or missing X-Custom-Header.")]
    BadCustomHeader,
}

impl GateError {
    /// Get HTTP status code for this rejection
    pub fn status_code(&self) -> u16 {
        match self {
            GateError::MissingToken => 401,
            GateError::InvalidToken => 401,
            GateError::Forbidden => 403,
            GateError::Internal(_) => 401,
            GateError::BadCustomHeader => 400,
        }
    }

    /// Message placed in the response envelope
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Errors raised by the service outside the gate
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Gate rejection surfaced from a handler (e.g. refresh token checks)
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Document does not exist (HTTP 404)
    #[error("Resource not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Request body is not a JSON object (HTTP 422)
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Multipart upload missing its file part or unreadable (HTTP 400)
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// Token could not be minted (HTTP 500)
    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    /// Configuration error (HTTP 500)
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// State management error (HTTP 500)
    #[error("State error: {0}")]
    StateError(String),
}

impl ServiceError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Gate(e) => e.status_code(),
            ServiceError::NotFound { .. } => 404,
            ServiceError::InvalidDocument(_) => 422,
            ServiceError::InvalidUpload(_) => 400,
            ServiceError::TokenIssuance(_) => 500,
            ServiceError::ConfigurationError(_) => 500,
            ServiceError::StateError(_) => 500,
        }
    }

    /// Get user-facing error message (no internal detail)
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Gate(e) => e.user_message(),
            ServiceError::NotFound { .. } => "Resource not found".to_string(),
            ServiceError::InvalidDocument(reason) => format!("Invalid document: {}", reason),
            ServiceError::InvalidUpload(reason) => format!("Invalid upload: {}", reason),
            ServiceError::TokenIssuance(_) => "Internal error".to_string(),
            ServiceError::ConfigurationError(_) => "Internal error".to_string(),
            ServiceError::StateError(_) => "Internal error".to_string(),
        }
    }
}
