// Request and response interceptors installed on every API client

use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, StatusCode};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

use super::session::Session;

/// Where the client sends the user when the session ends
pub const LOGIN_PATH: &str = "/login";

/// Hook applied to each outgoing request before it is sent
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: RequestBuilder) -> RequestBuilder;
}

/// Hook observing each response status before the body is read
pub trait ResponseInterceptor: Send + Sync {
    fn on_response(&self, status: StatusCode, url: &str);
}

/// Redirect target for an ended session
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator for headless use: records the redirect in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        info!(path = %path, "Navigation requested");
    }
}

/// Navigator that remembers every path it was sent to
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visited
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_string());
    }
}

/// Attaches `Authorization: Bearer <token>` when the session holds a token
#[derive(Debug, Clone)]
pub struct BearerAuth {
    session: Session,
}

impl BearerAuth {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

impl RequestInterceptor for BearerAuth {
    fn intercept(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }
}

/// Ends the session on any 401 and sends the user to the login page
///
/// Other statuses, including 403, pass through untouched.
#[derive(Clone)]
pub struct SessionExpiry {
    session: Session,
    navigator: Arc<dyn Navigator>,
}

impl SessionExpiry {
    pub fn new(session: Session, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }
}

impl ResponseInterceptor for SessionExpiry {
    fn on_response(&self, status: StatusCode, url: &str) {
        if status != StatusCode::UNAUTHORIZED {
            return;
        }

        warn!(url = %url, "Received 401, clearing session");
        if let Err(e) = self.session.clear() {
            error!(error = %e, "Failed to clear session after 401");
        }
        self.navigator.navigate(LOGIN_PATH);
    }
}
