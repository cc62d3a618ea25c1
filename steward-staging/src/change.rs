//! The staging change model.

use serde::{Deserialize, Serialize};
use steward_types::{
    ApplicationId, SchemaMetadata, SubscriptionMetadata, TopicCreateParams, TopicMetadata,
};

/// One atomic staging instruction.
///
/// Changes are compared structurally (never by identity) so a client can
/// round-trip a computed change-set and use it as a filter on a later
/// build. Only real variants carry an applicable operation; `AlwaysFails`
/// is a permanently-failing placeholder that keeps a detected precondition
/// violation visible in the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Change {
    /// Create a topic with the given metadata and physical parameters.
    #[serde(rename_all = "camelCase")]
    CreateTopic {
        topic: TopicMetadata,
        params: TopicCreateParams,
    },

    /// Delete a topic.
    #[serde(rename_all = "camelCase")]
    DeleteTopic { topic_name: String },

    /// Update a topic's governed settings to the given state.
    #[serde(rename_all = "camelCase")]
    UpdateTopic { topic: TopicMetadata },

    /// Create a subscription.
    #[serde(rename_all = "camelCase")]
    Subscribe { subscription: SubscriptionMetadata },

    /// Delete the subscription of an application to a topic.
    #[serde(rename_all = "camelCase")]
    Unsubscribe {
        topic_name: String,
        application_id: ApplicationId,
    },

    /// Publish one schema version.
    #[serde(rename_all = "camelCase")]
    PublishSchemaVersion { schema: SchemaMetadata },

    /// Authorize an additional producer on a topic.
    #[serde(rename_all = "camelCase")]
    AddProducer {
        topic_name: String,
        producer: ApplicationId,
    },

    /// Revoke an additional producer from a topic.
    #[serde(rename_all = "camelCase")]
    RemoveProducer {
        topic_name: String,
        producer: ApplicationId,
    },

    /// Transfer topic ownership.
    #[serde(rename_all = "camelCase")]
    ChangeOwner {
        topic_name: String,
        new_owner: ApplicationId,
    },

    /// An ordered group of sub-changes applying as one unit.
    #[serde(rename_all = "camelCase")]
    Compound { changes: Vec<Change> },

    /// A detected precondition violation; applying it always fails with
    /// the recorded reason.
    #[serde(rename_all = "camelCase")]
    AlwaysFails { topic_name: String, reason: String },
}

impl Change {
    /// Returns true if this change (or any sub-change of a compound)
    /// creates the named topic.
    #[must_use]
    pub fn creates_topic(&self, name: &str) -> bool {
        match self {
            Change::CreateTopic { topic, .. } => topic.name == name,
            Change::Compound { changes } => changes.iter().any(|c| c.creates_topic(name)),
            _ => false,
        }
    }
}

/// Success or failure of one applied change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum ChangeOutcome {
    /// The change was applied.
    Success,
    /// The change failed; earlier successes stand.
    #[serde(rename_all = "camelCase")]
    Failure { message: String },
}

/// The per-change record produced by [`Staging::apply`](crate::Staging).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingResult {
    /// The applied change.
    pub change: Change,
    /// What happened.
    pub outcome: ChangeOutcome,
}

impl StagingResult {
    /// Records a success.
    #[must_use]
    pub fn succeeded(change: Change) -> Self {
        Self {
            change,
            outcome: ChangeOutcome::Success,
        }
    }

    /// Records a failure.
    #[must_use]
    pub fn failed(change: Change, message: impl Into<String>) -> Self {
        Self {
            change,
            outcome: ChangeOutcome::Failure {
                message: message.into(),
            },
        }
    }

    /// Returns true for a success outcome.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome == ChangeOutcome::Success
    }
}
