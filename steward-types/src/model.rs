//! Domain metadata records governed by the Steward core.
//!
//! Every record type here is an Entity Record in the log-backed stores: it
//! has a stable string key (`Keyed`) and serializes structurally to JSON.
//! The latest log record for a key wins; an absent key means deleted or
//! never existed.

use crate::ApplicationId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stored domain object with a stable string key.
///
/// The key identifies the record within its store; saving a record with the
/// same key replaces the previous version, deleting appends a tombstone.
pub trait Keyed {
    /// Returns the stable store key of this record.
    fn key(&self) -> String;
}

/// The governance classification of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TopicType {
    /// Business events, consumed by subscription.
    Events,
    /// Compacted data topics, consumed by subscription.
    Data,
    /// Command topics; subscribers produce commands to the owner.
    Commands,
    /// Application-internal topics, never subscribable.
    Internal,
}

/// Metadata for one topic in one environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicMetadata {
    /// The topic name (store key).
    pub name: String,

    /// Governance classification.
    pub topic_type: TopicType,

    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,

    /// The application owning this topic.
    pub owner_application_id: ApplicationId,

    /// Whether the topic is deprecated.
    #[serde(default)]
    pub deprecated: bool,

    /// Deprecation notice shown to subscribers.
    #[serde(default)]
    pub deprecation_text: Option<String>,

    /// End-of-life date for a deprecated topic.
    #[serde(default)]
    pub eol_date: Option<NaiveDate>,

    /// Whether new subscriptions require owner approval.
    #[serde(default)]
    pub subscription_approval_required: bool,

    /// Applications authorized to produce to this topic besides the owner.
    #[serde(default)]
    pub producers: Vec<ApplicationId>,
}

impl TopicMetadata {
    /// Returns true for application-internal topics.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.topic_type == TopicType::Internal
    }
}

impl Keyed for TopicMetadata {
    fn key(&self) -> String {
        self.name.clone()
    }
}

/// The approval state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionState {
    /// Waiting for owner approval.
    Pending,
    /// Approved; the subscriber's ACLs include this topic.
    Approved,
    /// Rejected by the topic owner.
    Rejected,
}

/// A subscription of a client application to a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionMetadata {
    /// Unique subscription ID (store key).
    pub id: String,

    /// The subscribing application.
    pub client_application_id: ApplicationId,

    /// The topic being subscribed to.
    pub topic_name: String,

    /// Approval state.
    pub state: SubscriptionState,

    /// Free-text purpose supplied by the subscriber.
    #[serde(default)]
    pub description: Option<String>,
}

impl Keyed for SubscriptionMetadata {
    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Per-environment metadata of a registered application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationMetadata {
    /// The application (store key).
    pub application_id: ApplicationId,

    /// The messaging-cluster principal this application authenticates as,
    /// if credentials have been issued for this environment.
    #[serde(default)]
    pub kafka_principal: Option<String>,

    /// Name prefixes reserved for the application's internal topics.
    #[serde(default)]
    pub internal_topic_prefixes: Vec<String>,

    /// Name prefixes reserved for the application's consumer groups.
    #[serde(default)]
    pub consumer_group_prefixes: Vec<String>,

    /// Name prefixes reserved for the application's transactional IDs.
    #[serde(default)]
    pub transaction_id_prefixes: Vec<String>,
}

impl Keyed for ApplicationMetadata {
    fn key(&self) -> String {
        self.application_id.to_string()
    }
}

/// One published version of a topic's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaMetadata {
    /// Unique schema ID (store key).
    pub id: String,

    /// The topic this schema belongs to.
    pub topic_name: String,

    /// Version number, starting at 1 and strictly increasing.
    pub schema_version: u32,

    /// The JSON schema text.
    pub json_schema: String,

    /// Change description relative to the previous version.
    #[serde(default)]
    pub change_description: Option<String>,
}

impl Keyed for SchemaMetadata {
    fn key(&self) -> String {
        self.id.clone()
    }
}

/// The state of an application ownership request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    /// Submitted, awaiting an administrator decision.
    Submitted,
    /// Granted.
    Approved,
    /// Declined.
    Rejected,
    /// Previously approved, later revoked.
    Revoked,
}

/// A user's request to become owner of an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationOwnerRequest {
    /// Unique request ID (store key).
    pub id: String,

    /// The application being requested.
    pub application_id: ApplicationId,

    /// The requesting user.
    pub user_name: String,

    /// Current state.
    pub state: RequestState,

    /// When the request was created.
    pub created_at: DateTime<Utc>,

    /// When the state last changed.
    pub last_status_change_at: DateTime<Utc>,

    /// Optional administrator comments.
    #[serde(default)]
    pub comments: Option<String>,
}

impl ApplicationOwnerRequest {
    /// Only submitted requests may be canceled by the requester.
    #[must_use]
    pub fn is_cancelable(&self) -> bool {
        self.state == RequestState::Submitted
    }
}

impl Keyed for ApplicationOwnerRequest {
    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Physical creation parameters for a topic, resolved on the source
/// environment when staging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicCreateParams {
    /// Number of partitions.
    pub partition_count: u32,

    /// Topic-level configuration entries (e.g. `cleanup.policy`).
    #[serde(default)]
    pub topic_configs: BTreeMap<String, String>,
}
