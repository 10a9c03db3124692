// Security event logging

use tracing::{info, warn};

use crate::auth::token::TokenFingerprint;
use crate::core::errors::GateError;

/// Gate outcome worth an audit line
#[derive(Debug, Clone)]
pub enum GateEvent {
    Forwarded { subject: String, role: String },
    Rejected { reason: GateError },
}

/// Where the request came from
#[derive(Debug, Clone, Default)]
pub struct RequestOrigin {
    pub path: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Audit logger for gate decisions
///
/// Emits structured `tracing` events only. Tokens are reduced to their
/// fingerprint before they reach a log line.
#[derive(Debug, Clone, Default)]
pub struct AuditLogger;

impl AuditLogger {
    pub fn new() -> Self {
        Self
    }

    pub fn log_gate_event(
        &self,
        event: &GateEvent,
        fingerprint: Option<&TokenFingerprint>,
        origin: &RequestOrigin,
    ) {
        let fingerprint = fingerprint.map(|f| f.as_str());
        match event {
            GateEvent::Forwarded { subject, role } => {
                info!(
                    token_fingerprint = ?fingerprint,
                    subject = %subject,
                    role = %role,
                    path = %origin.path,
                    ip_address = ?origin.ip_address,
                    user_agent = ?origin.user_agent,
                    "Request authorized"
                );
            }
            GateEvent::Rejected { reason } => {
                warn!(
                    token_fingerprint = ?fingerprint,
                    status = reason.status_code(),
                    reason = %reason,
                    path = %origin.path,
                    ip_address = ?origin.ip_address,
                    user_agent = ?origin.user_agent,
                    "Request rejected by gate"
                );
            }
        }
    }
}
