//! The shared error taxonomy of the governance core.

use thiserror::Error;

/// Result type for governance operations.
pub type GovernanceResult<T> = Result<T, GovernanceError>;

/// Errors that can occur in governance operations.
///
/// The REST layer (outside the core) maps `NotFound`, `InvalidState` and
/// `InvalidArgument` to client errors and everything else to server errors.
/// `Reconciliation` means a post-mutation listener failed while the mutation
/// itself stands; it is logged for operator follow-up, never surfaced as a
/// mutation failure.
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// A referenced application, environment, topic, subscription or request
    /// does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A domain invariant was violated (e.g. staging a deprecated topic,
    /// subscribing to an internal topic, canceling a non-cancelable request).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Malformed input (e.g. a prefix mismatch).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The underlying log write failed. Always propagated, never swallowed.
    #[error("log transport error: {0}")]
    Transport(String),

    /// A post-mutation listener failed; the triggering mutation stands.
    #[error("reconciliation failed in listener {listener}: {message}")]
    Reconciliation {
        /// Name of the failing listener.
        listener: String,
        /// The listener's failure message.
        message: String,
    },
}
