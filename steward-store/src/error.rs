//! Error types for the store layer.

use steward_types::GovernanceError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying log write failed. Never retried internally.
    #[error("log transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The repository's log consumption task has stopped.
    #[error("log consumer stopped for store '{0}'")]
    ConsumerStopped(String),

    /// A memoized repository was requested with a different value type.
    #[error("store '{0}' is already open with a different value type")]
    WrongValueType(String),
}

impl From<StoreError> for GovernanceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Serialization(e) => GovernanceError::Serialization(e),
            StoreError::WrongValueType(s) => GovernanceError::InvalidArgument(s),
            other => GovernanceError::Transport(other.to_string()),
        }
    }
}
