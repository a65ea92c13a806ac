//! Load error types
//!
//! `LoadFailure` is what a failed task leaves behind in page state.
//! `LoadError` is what the reducer returns when it refuses an event.

use thiserror::Error;

use super::task::TaskKind;
use crate::api::ApiError;

/// Failure recorded on a task, cloneable so it can live in published state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// Transient transport failure (unreachable, timeout, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Backend answered with something we could not use
    #[error("Invalid response: {0}")]
    Invalid(String),
}

impl From<&ApiError> for LoadFailure {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Unavailable | ApiError::Timeout | ApiError::Request(_) => {
                LoadFailure::Network(err.to_string())
            }
            ApiError::Api { status, message } => LoadFailure::Api {
                status: *status,
                message: message.clone(),
            },
            ApiError::NotFound(what) => LoadFailure::Api {
                status: 404,
                message: what.clone(),
            },
            ApiError::Decode(msg) | ApiError::Validation(msg) => LoadFailure::Invalid(msg.clone()),
        }
    }
}

impl From<ApiError> for LoadFailure {
    fn from(err: ApiError) -> Self {
        LoadFailure::from(&err)
    }
}

/// Reasons the reducer rejects a task event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Event belongs to a superseded request; discarded, never surfaced
    #[error("Stale result from generation {generation} (current {current})")]
    Stale { generation: u64, current: u64 },

    /// Detail or auxiliary task started before the primary succeeded
    #[error("Primary task has not succeeded")]
    PrimaryNotReady,

    /// Task of this kind already exists in the current generation
    #[error("{0} task already started")]
    AlreadyStarted(TaskKind),

    /// Completion for a task that was never started or already finished
    #[error("No pending {0} task")]
    UnknownTask(TaskKind),
}

impl LoadError {
    pub fn is_stale(&self) -> bool {
        matches!(self, LoadError::Stale { .. })
    }
}

/// Result type alias for reducer operations
pub type LoadResult<T> = Result<T, LoadError>;
