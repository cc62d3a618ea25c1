//! Identities and their derivation inputs.

use crate::binding::AclBinding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use steward_types::TopicMetadata;

/// A principal together with its currently required binding set.
///
/// The binding set is always the output of a full derivation over current
/// state, never an incrementally patched collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclIdentity {
    /// The messaging-cluster principal name.
    pub principal: String,

    /// The complete required binding set.
    pub bindings: BTreeSet<AclBinding>,
}

/// Everything the deriver needs to know about one identity.
///
/// Snapshot of current state; building it is the caller's job (see
/// [`UpdateAclListener`](crate::UpdateAclListener)).
#[derive(Debug, Clone, Default)]
pub struct IdentityContext {
    /// Topics owned by the identity's application.
    pub owned_topics: Vec<TopicMetadata>,

    /// Topics the application is an additional producer of.
    pub producer_topics: Vec<TopicMetadata>,

    /// Topics the application holds an approved subscription to.
    pub subscribed_topics: Vec<TopicMetadata>,

    /// Reserved internal-topic name prefixes.
    pub internal_topic_prefixes: Vec<String>,

    /// Reserved consumer-group name prefixes.
    pub consumer_group_prefixes: Vec<String>,

    /// Reserved transactional-ID prefixes.
    pub transaction_id_prefixes: Vec<String>,

    /// Read-only identities (e.g. tooling credentials) never receive write
    /// or admin grants.
    pub read_only: bool,
}
