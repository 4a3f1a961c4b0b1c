//! Error types with HTTP status code mapping.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

/// Error type for koliwada operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Session errors
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Forbidden: cannot {action} {subject}")]
    Forbidden { action: String, subject: String },

    // Permission model errors
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Cannot toggle {action} on {subject:?}: {reason}")]
    InvalidToggle {
        action: String,
        subject: String,
        reason: &'static str,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    // Request errors
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unsupported media type: expected {expected}")]
    UnsupportedMediaType { expected: String },

    // Config and session-profile errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    // System errors
    #[error("Invalid address: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map error to HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthorized | Error::TokenExpired => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,

            Error::InvalidAction(_)
            | Error::InvalidToggle { .. }
            | Error::BadRequest(_)
            | Error::AddrParse(_) => StatusCode::BAD_REQUEST,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,

            // Profile failures are mapped to Unauthorized by the gateway before
            // they get here; anything left is a deployment problem.
            Error::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,

            Error::Io(_) | Error::Json(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert error into HTTP response.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!("Internal error: {self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        crate::response::error_body(status, &message)
    }
}

/// Result type alias using koliwada's Error.
pub type Result<T> = std::result::Result<T, Error>;
