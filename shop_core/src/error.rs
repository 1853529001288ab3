//! Error types for the shop_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Distinguishes a malformed request from one the caller is not allowed to make.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationKind {
    /// HTTP 400, or a request rejected locally before sending
    BadRequest,
    /// HTTP 403
    Forbidden,
}

/// Failure half of a gateway outcome.
///
/// Every request that goes through the gateway ends in either a body or
/// exactly one of these variants.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Missing, invalid or expired token. Callers should prompt a new login.
    #[error("authentication required, please log in again")]
    AuthFailure,

    #[error("resource not found")]
    NotFound,

    #[error("{message}")]
    Validation {
        kind: ValidationKind,
        message: String,
    },

    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// No response was received (DNS, refused connection, reset, timeout)
    #[error("network request failed: {0}")]
    Network(String),
}

impl ApiError {
    /// Shorthand for a locally detected bad request
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Validation {
            kind: ValidationKind::BadRequest,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Validation {
            kind: ValidationKind::Forbidden,
            message: message.into(),
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::AuthFailure)
    }
}

/// Core error type for shop_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend (or the mock layer) answered with a failure outcome
    #[error(transparent)]
    Api(#[from] ApiError),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A successful response whose body did not match the expected shape
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session persistence error
    #[error("Session error: {0}")]
    Session(String),

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// The gateway failure behind this error, if any
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }
}
