// Configuration management

use crate::core::errors::ServiceError;
use secrecy::{ExposeSecret, Secret};
use std::env;

/// Header names checked, in order, when the canonical Authorization header is missing
pub const DEFAULT_AUTH_FALLBACK_HEADERS: [&str; 3] = [
    "x-http-authorization",
    "redirect-http-authorization",
    "x-forwarded-authorization",
];

/// Application configuration loaded from environment variables
///
/// Covers both the gate (server) and the API client. All values are
/// validated on load with clear error messages.
#[derive(Debug, Clone)]
pub struct Config {
    // Server configuration
    pub bind_address: String,
    pub port: u16,

    // Token verification and issuance
    pub jwt_secret: Secret<String>,
    pub jwt_issuer: Option<String>,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub revoked_token_ids: Vec<String>,

    // Gate configuration
    pub auth_fallback_headers: Vec<String>,
    pub custom_header_value: String,

    // Middleware configuration
    pub request_timeout_secs: u64,
    pub body_size_limit_bytes: usize,

    // API client configuration
    pub api_base_url: String,
    pub client_timeout_secs: u64,

    // Logging configuration
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Supports `.env` file loading in development (via dotenv crate).
    pub fn from_env() -> Result<Self, ServiceError> {
        #[cfg(not(test))]
        {
            dotenv::dotenv().ok(); // Ignore errors (file may not exist)
        }

        let config = Self {
            bind_address: Self::get_env_or_default("BIND_ADDRESS", "0.0.0.0"),
            port: Self::parse_port()?,
            jwt_secret: Secret::new(Self::get_required("JWT_SECRET")?),
            jwt_issuer: Self::get_optional_env("JWT_ISSUER"),
            access_token_ttl_secs: Self::parse_u64_or_default("ACCESS_TOKEN_TTL_SECS", 3600)?,
            refresh_token_ttl_secs: Self::parse_u64_or_default("REFRESH_TOKEN_TTL_SECS", 14 * 24 * 3600)?,
            revoked_token_ids: Self::get_list("REVOKED_TOKEN_IDS").unwrap_or_default(),
            auth_fallback_headers: Self::get_list("AUTH_FALLBACK_HEADERS").unwrap_or_else(|| {
                DEFAULT_AUTH_FALLBACK_HEADERS.iter().map(|s| s.to_string()).collect()
            }),
            custom_header_value: Self::get_required("CUSTOM_HEADER_VALUE")?,
            request_timeout_secs: Self::parse_u64_or_default("REQUEST_TIMEOUT_SECS", 30)?,
            body_size_limit_bytes: Self::parse_usize_or_default("BODY_SIZE_LIMIT_BYTES", 10 * 1024 * 1024)?,
            api_base_url: Self::get_env_or_default("API_BASE_URL", "http://localhost:8000/api"),
            client_timeout_secs: Self::parse_u64_or_default("CLIENT_TIMEOUT_SECS", 15)?,
            log_level: Self::get_env_or_default("LOG_LEVEL", "info"),
            log_format: Self::get_env_or_default("LOG_FORMAT", "json"),
        };

        config.validate()?;

        Ok(config)
    }

    fn get_env_or_default(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    fn get_optional_env(key: &str) -> Option<String> {
        match env::var(key) {
            Ok(value) if !value.trim().is_empty() => Some(value),
            _ => None,
        }
    }

    fn get_required(key: &str) -> Result<String, ServiceError> {
        let value = env::var(key)
            .map_err(|_| ServiceError::ConfigurationError(format!("{} not set", key)))?;

        if value.trim().is_empty() {
            return Err(ServiceError::ConfigurationError(format!("{} is empty", key)));
        }

        Ok(value)
    }

    /// Comma-separated list; `None` when the variable is unset
    fn get_list(key: &str) -> Option<Vec<String>> {
        env::var(key).ok().map(|raw| Self::split_list(&raw))
    }

    fn split_list(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }

    fn parse_port() -> Result<u16, ServiceError> {
        let port_str = env::var("PORT").unwrap_or_else(|_| "8000".to_string());
        let port = port_str.parse::<u16>().map_err(|e| {
            ServiceError::ConfigurationError(format!("Invalid PORT value '{}': {}", port_str, e))
        })?;

        if port == 0 {
            return Err(ServiceError::ConfigurationError(
                "PORT must be between 1 and 65535".to_string(),
            ));
        }

        Ok(port)
    }

    fn parse_u64_or_default(key: &str, default: u64) -> Result<u64, ServiceError> {
        match env::var(key) {
            Ok(value) => {
                let parsed = value.parse::<u64>().map_err(|e| {
                    ServiceError::ConfigurationError(format!("Invalid {} value '{}': {}", key, value, e))
                })?;

                if parsed == 0 {
                    return Err(ServiceError::ConfigurationError(format!(
                        "{} must be greater than 0",
                        key
                    )));
                }

                Ok(parsed)
            }
            _ => Ok(default),
        }
    }

    fn parse_usize_or_default(key: &str, default: usize) -> Result<usize, ServiceError> {
        match env::var(key) {
            Ok(value) => {
                let parsed = value.parse::<usize>().map_err(|e| {
                    ServiceError::ConfigurationError(format!("Invalid {} value '{}': {}", key, value, e))
                })?;

                if parsed == 0 {
                    return Err(ServiceError::ConfigurationError(format!(
                        "{} must be greater than 0",
                        key
                    )));
                }

                Ok(parsed)
            }
            _ => Ok(default),
        }
    }

    /// Validate all configuration values
    fn validate(&self) -> Result<(), ServiceError> {
        if self.jwt_secret.expose_secret().len() < 16 {
            return Err(ServiceError::ConfigurationError(
                "JWT_SECRET must be at least 16 characters".to_string(),
            ));
        }

        Self::validate_url(&self.api_base_url, "API base")?;
        Self::validate_header_names(&self.auth_fallback_headers)?;
        Self::validate_log_level(&self.log_level)?;
        Self::validate_log_format(&self.log_format)?;

        Ok(())
    }

    fn validate_url(url: &str, description: &str) -> Result<(), ServiceError> {
        let parsed = url::Url::parse(url).map_err(|e| {
            ServiceError::ConfigurationError(format!("Invalid {} URL '{}': {}", description, url, e))
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ServiceError::ConfigurationError(format!(
                "Invalid {} URL '{}': scheme must be http or https",
                description, url
            )));
        }

        Ok(())
    }

    fn validate_header_names(names: &[String]) -> Result<(), ServiceError> {
        for name in names {
            axum::http::HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ServiceError::ConfigurationError(format!(
                    "Invalid AUTH_FALLBACK_HEADERS entry '{}': {}",
                    name, e
                ))
            })?;
        }
        Ok(())
    }

    fn validate_log_level(level: &str) -> Result<(), ServiceError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&level.to_lowercase().as_str()) {
            return Err(ServiceError::ConfigurationError(format!(
                "Invalid LOG_LEVEL '{}': must be one of {}",
                level,
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }

    fn validate_log_format(format: &str) -> Result<(), ServiceError> {
        if format != "json" && format != "text" {
            return Err(ServiceError::ConfigurationError(format!(
                "Invalid LOG_FORMAT '{}': must be 'json' or 'text'",
                format
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Configuration for tests; bypasses environment loading
    pub fn test_config() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            jwt_secret: Secret::new("test-secret-for-herd-gate".to_string()),
            jwt_issuer: None,
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 14 * 24 * 3600,
            revoked_token_ids: vec![],
            auth_fallback_headers: DEFAULT_AUTH_FALLBACK_HEADERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            custom_header_value: "herd-device".to_string(),
            request_timeout_secs: 30,
            body_size_limit_bytes: 10 * 1024 * 1024,
            api_base_url: "http://localhost:8000/api".to_string(),
            client_timeout_secs: 15,
            log_level: "info".to_string(),
            log_format: "json".to_string(),
        }
    }
}
