// Session token verification, issuance and fingerprinting

use std::collections::HashSet;
use std::fmt;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::core::errors::{GateError, ServiceError};
use crate::core::models::{Claims, TokenKind};

/// SHA-256 of a bearer token (64-character hex string)
///
/// Logged in place of the token itself so audit lines can be correlated
/// without exposing credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenFingerprint(String);

impl TokenFingerprint {
    pub fn of(token: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Verifies bearer tokens for the gate
///
/// Implementations are read-only shared state: signing keys and the
/// revocation list never change while requests are in flight.
pub trait TokenVerifier: Send + Sync {
    /// Verify an access token and return its claims
    fn verify(&self, token: &str) -> Result<Claims, GateError>;
}

/// HS256 JWT verifier with a revocation list keyed by token ID
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    revoked: HashSet<String>,
}

impl JwtVerifier {
    pub fn new(secret: &[u8], issuer: Option<&str>, revoked: impl IntoIterator<Item = String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;
        if let Some(iss) = issuer {
            validation.set_issuer(&[iss]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            revoked: revoked.into_iter().collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jwt_secret.expose_secret().as_bytes(),
            config.jwt_issuer.as_deref(),
            config.revoked_token_ids.clone(),
        )
    }

    /// Verify a token that may be used on API routes
    pub fn verify_access(&self, token: &str) -> Result<Claims, GateError> {
        self.verify_kind(token, TokenKind::Access)
    }

    /// Verify a token that may only be exchanged for a new access token
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, GateError> {
        self.verify_kind(token, TokenKind::Refresh)
    }

    fn verify_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, GateError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(reason = ?e.kind(), "Token rejected by decoder");
                GateError::InvalidToken
            })?
            .claims;

        if let Some(ref jti) = claims.jti {
            if self.revoked.contains(jti) {
                debug!(jti = %jti, "Token rejected: revoked");
                return Err(GateError::InvalidToken);
            }
        }

        if claims.typ != expected {
            debug!(kind = ?claims.typ, expected = ?expected, "Token rejected: wrong kind");
            return Err(GateError::InvalidToken);
        }

        Ok(claims)
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Claims, GateError> {
        self.verify_access(token)
    }
}

/// Access and refresh token returned together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Mints HS256 session tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    issuer: Option<String>,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], issuer: Option<String>, access_ttl_secs: u64, refresh_ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            issuer,
            access_ttl_secs: access_ttl_secs as i64,
            refresh_ttl_secs: refresh_ttl_secs as i64,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jwt_secret.expose_secret().as_bytes(),
            config.jwt_issuer.clone(),
            config.access_token_ttl_secs,
            config.refresh_token_ttl_secs,
        )
    }

    /// Sign a token of the given kind for a subject
    pub fn issue(
        &self,
        subject: &str,
        role: &str,
        name: Option<&str>,
        kind: TokenKind,
    ) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl_secs,
            TokenKind::Refresh => self.refresh_ttl_secs,
        };

        let claims = Claims {
            sub: subject.to_string(),
            role: role.to_string(),
            exp: now + ttl,
            iat: Some(now),
            jti: Some(Uuid::new_v4().to_string()),
            iss: self.issuer.clone(),
            name: name.map(|n| n.to_string()),
            typ: kind,
        };

        self.sign(&claims)
    }

    /// Sign arbitrary claims (e.g. already-expired tokens in tests)
    pub fn sign(&self, claims: &Claims) -> Result<String, ServiceError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| ServiceError::TokenIssuance(e.to_string()))
    }

    /// Issue a fresh access token plus refresh token for the same subject
    pub fn issue_pair(&self, subject: &str, role: &str, name: Option<&str>) -> Result<TokenPair, ServiceError> {
        Ok(TokenPair {
            token: self.issue(subject, role, name, TokenKind::Access)?,
            refresh_token: self.issue(subject, role, name, TokenKind::Refresh)?,
        })
    }
}
