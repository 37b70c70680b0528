//! Verification outcome.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Result of verifying one handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Accept,
    /// Refuse the upgrade with an HTTP status (401 or 500) and reason text.
    Reject { status: StatusCode, reason: String },
}

impl AuthDecision {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        AuthDecision::Reject {
            status: StatusCode::UNAUTHORIZED,
            reason: reason.into(),
        }
    }

    pub fn misconfigured(reason: impl Into<String>) -> Self {
        AuthDecision::Reject {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            reason: reason.into(),
        }
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, AuthDecision::Accept)
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AuthDecision::Accept => None,
            AuthDecision::Reject { status, .. } => Some(*status),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            AuthDecision::Accept => None,
            AuthDecision::Reject { reason, .. } => Some(reason),
        }
    }
}

/// Only rejections are rendered; an accepted handshake continues to the upgrade.
impl IntoResponse for AuthDecision {
    fn into_response(self) -> Response {
        match self {
            AuthDecision::Accept => StatusCode::OK.into_response(),
            AuthDecision::Reject { status, reason } => (status, reason).into_response(),
        }
    }
}
