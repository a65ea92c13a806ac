//! Explorer API error types
//!
//! Errors produced by the explorer API client and its fakes.

use thiserror::Error;

/// Errors that can occur when talking to the explorer API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Backend could not be reached
    #[error("Explorer API unavailable")]
    Unavailable,

    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success status other than 404
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Caller supplied an unusable argument
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ApiError {
    /// Classify a `reqwest` send failure
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Unavailable
        } else {
            ApiError::Request(err)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

/// Result type alias for explorer API calls
pub type ApiResult<T> = Result<T, ApiError>;
