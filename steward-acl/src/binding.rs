//! The authorization-binding model.
//!
//! A binding grants one operation on one resource (literal name or name
//! prefix) to the identity holding it. Bindings are totally ordered so the
//! derived grant collection is a `BTreeSet` value with set equality.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of cluster resource a binding applies to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    /// The cluster itself.
    Cluster,
    /// A topic.
    Topic,
    /// A consumer group.
    Group,
    /// A transactional ID.
    TransactionalId,
}

/// Whether the resource name is matched literally or as a prefix.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternType {
    /// Exact resource name.
    Literal,
    /// All resources whose name starts with the given prefix.
    Prefixed,
}

/// The operation a binding grants or denies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AclOperation {
    All,
    Read,
    Write,
    Create,
    Delete,
    Alter,
    Describe,
    ClusterAction,
    DescribeConfigs,
    AlterConfigs,
    IdempotentWrite,
}

/// Allow or deny.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    Allow,
    Deny,
}

/// One authorization grant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AclBinding {
    /// Resource kind.
    pub resource_type: ResourceType,

    /// Resource name or name prefix.
    pub resource_name: String,

    /// Literal or prefixed matching.
    pub pattern: PatternType,

    /// Granted operation.
    pub operation: AclOperation,

    /// Allow or deny.
    pub permission: Permission,
}

impl AclBinding {
    /// Creates an allow binding.
    #[must_use]
    pub fn allow(
        resource_type: ResourceType,
        resource_name: impl Into<String>,
        pattern: PatternType,
        operation: AclOperation,
    ) -> Self {
        Self {
            resource_type,
            resource_name: resource_name.into(),
            pattern,
            operation,
            permission: Permission::Allow,
        }
    }
}

impl fmt::Display for AclBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} {:?} on {:?} {:?} '{}'",
            self.permission, self.operation, self.pattern, self.resource_type, self.resource_name
        )
    }
}
