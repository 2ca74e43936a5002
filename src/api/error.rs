//! Remote API error types
//!
//! Every failure the transport can report is mapped onto one of these
//! variants. HTTP status codes are classified once, here, so callers can
//! match on the kind of failure instead of inspecting raw status codes.

use serde::Serialize;
use thiserror::Error;

/// Errors returned by a [`Transport`](super::Transport)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// 404 from the remote service
    #[error("Not found: {0}")]
    NotFound(String),

    /// 401, the token was missing, expired or revoked
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// 403, the token lacks access to the resource
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// 422, the request was understood but rejected
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 5xx from the remote service
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-success status
    #[error("Unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response (DNS, TLS, timeout, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be decoded into the expected shape
    #[error("Error while decoding response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-success HTTP status
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => Self::Unauthorized(message),
            403 => Self::PermissionDenied(message),
            404 => Self::NotFound(message),
            422 => Self::Validation(message),
            500..=599 => Self::Server { status, message },
            _ => Self::Status { status, message },
        }
    }

    /// Coarse failure category used in bulk edit reports
    #[must_use]
    pub const fn cause(&self) -> FailureCause {
        match self {
            Self::NotFound(_) => FailureCause::NotFound,
            Self::Unauthorized(_) | Self::PermissionDenied(_) => FailureCause::Permission,
            Self::Validation(_) => FailureCause::Validation,
            Self::Status { status, .. } if *status < 500 => FailureCause::Validation,
            Self::Network(_) => FailureCause::Network,
            Self::Server { .. } | Self::Status { .. } | Self::Decode(_) => FailureCause::Server,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

/// Why a single remote mutation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureCause {
    NotFound,
    Permission,
    Validation,
    Network,
    Server,
}

impl FailureCause {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not-found",
            Self::Permission => "permission",
            Self::Validation => "validation",
            Self::Network => "network",
            Self::Server => "server",
        }
    }
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
