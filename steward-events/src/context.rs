//! Ambient event context.
//!
//! Listener chains may resolve on any worker thread, so the per-request
//! attributes are captured eagerly into an immutable value when the sink is
//! created, never read lazily from thread-local or request-scoped state.

use serde::{Deserialize, Serialize};
use steward_types::EnvironmentId;

/// The ambient attributes of one mutation, snapshotted at sink creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventContext {
    /// The environment the mutation targets.
    pub environment: EnvironmentId,

    /// The acting user, if the mutation originated from a user request.
    #[serde(default)]
    pub user_name: Option<String>,

    /// Whether the acting user holds the administrator role.
    #[serde(default)]
    pub is_admin: bool,

    /// The originating request URI, if any.
    #[serde(default)]
    pub request_uri: Option<String>,
}

impl EventContext {
    /// Creates a context for a system-initiated mutation (no acting user).
    #[must_use]
    pub fn system(environment: EnvironmentId) -> Self {
        Self {
            environment,
            user_name: None,
            is_admin: false,
            request_uri: None,
        }
    }

    /// Sets the acting user.
    #[must_use]
    pub fn with_user(mut self, user_name: impl Into<String>, is_admin: bool) -> Self {
        self.user_name = Some(user_name.into());
        self.is_admin = is_admin;
        self
    }

    /// Sets the originating request URI.
    #[must_use]
    pub fn with_request_uri(mut self, uri: impl Into<String>) -> Self {
        self.request_uri = Some(uri.into());
        self
    }
}

/// Supplies the current ambient context when a sink is created.
///
/// The REST layer implements this against its request-scoped security
/// context; the core only ever sees the captured snapshot.
pub trait ContextProvider: Send + Sync {
    /// Captures the current ambient attributes for `environment`.
    fn current(&self, environment: &EnvironmentId) -> EventContext;
}

/// Context provider for background and test use: every sink gets a
/// system context.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemContextProvider;

impl ContextProvider for SystemContextProvider {
    fn current(&self, environment: &EnvironmentId) -> EventContext {
        EventContext::system(environment.clone())
    }
}
