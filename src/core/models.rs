// Token claims and per-request authorization decisions

use serde::{Deserialize, Serialize};

/// Role claim value that grants access to admin routes
pub const ADMIN_ROLE: &str = "admin";

/// Collections only admins may read or write, whatever the route prefix
pub const ADMIN_COLLECTIONS: [&str; 1] = ["users"];

/// True when `collection` (or the document it nests under) is admin-owned
pub fn is_admin_collection(collection: &str) -> bool {
    ADMIN_COLLECTIONS.contains(&collection)
}

/// Whether a token is meant for API calls or for minting new access tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    #[default]
    Access,
    Refresh,
}

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Role claim, e.g. "admin", "vet", "farmer"
    #[serde(default)]
    pub role: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Token ID, checked against the revocation list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Display name of the subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub typ: TokenKind,
}

impl Claims {
    /// Exact, case-sensitive comparison against the admin role
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// Access level a route demands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Any verified bearer token
    Authenticated,
    /// Verified bearer token with role claim "admin"
    AdminOnly,
}

/// Outcome of the gate for one request. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// No token, or a token that failed verification
    Unauthenticated,
    /// Verified token on a route that needs no role
    Authenticated(Claims),
    /// Verified token lacking the required role
    Forbidden,
    /// Verified token carrying the required role
    Authorized(Claims),
}

impl AuthDecision {
    /// True when the request may reach its handler
    pub fn is_forwarded(&self) -> bool {
        matches!(self, AuthDecision::Authenticated(_) | AuthDecision::Authorized(_))
    }
}
