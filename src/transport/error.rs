//! Transport error types
//!
//! Every failure coming out of the HTTP layer is normalized into
//! [`ApiError`] so callers only ever match on one shape.

use thiserror::Error;

/// Errors produced by the backend client
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// No response was received (connection refused, DNS, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Backend returned 401; the stored token has been discarded
    #[error("Session expired, please log in again")]
    Unauthorized,

    /// Backend could not resolve the requested resource
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Any other non-2xx response
    #[error("API error {status}: {message}")]
    Http { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid request built by the caller (bad URL, empty identifier)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Local file access failed (uploads, downloads)
    #[error("IO error: {0}")]
    Io(String),
}

impl ApiError {
    /// Whether the failure happened before the backend answered
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout)
    }

    /// HTTP status associated with this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() || err.is_request() {
            ApiError::Network(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Io(err.to_string())
    }
}

/// Result type alias for backend calls
pub type ApiResult<T> = Result<T, ApiError>;
