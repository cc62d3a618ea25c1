//! The pure authorization-policy deriver.

use crate::binding::{AclBinding, AclOperation, PatternType, ResourceType};
use crate::identity::IdentityContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use steward_types::{TopicMetadata, TopicType};

/// Literal resource name of the cluster itself.
pub const CLUSTER_RESOURCE_NAME: &str = "kafka-cluster";

/// Globally configured derivation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AclConfig {
    /// Bindings applied verbatim to every identity, on top of the derived
    /// set (operator-configured, e.g. a cluster-wide IDEMPOTENT_WRITE).
    #[serde(default)]
    pub default_bindings: Vec<AclBinding>,
}

/// Operations granted on a topic an identity may only consume.
const READ_TOPIC_OPERATIONS: [AclOperation; 3] = [
    AclOperation::Describe,
    AclOperation::DescribeConfigs,
    AclOperation::Read,
];

/// Operations granted on a topic an identity produces to. Superset of the
/// read set, so a topic both owned and subscribed collapses to these grants.
const WRITE_TOPIC_OPERATIONS: [AclOperation; 4] = [
    AclOperation::Describe,
    AclOperation::DescribeConfigs,
    AclOperation::Read,
    AclOperation::Write,
];

/// Computes the full required binding set for one identity.
///
/// Pure and deterministic over the given context; cannot fail. Callers
/// recompute the whole set on every relevant event rather than patching a
/// previous result.
#[must_use]
pub fn compute_required_bindings(
    ctx: &IdentityContext,
    config: &AclConfig,
) -> BTreeSet<AclBinding> {
    let mut bindings = BTreeSet::new();

    // Every identity may describe the cluster, plus whatever the operator
    // configured as defaults.
    bindings.insert(AclBinding::allow(
        ResourceType::Cluster,
        CLUSTER_RESOURCE_NAME,
        PatternType::Literal,
        AclOperation::Describe,
    ));
    bindings.insert(AclBinding::allow(
        ResourceType::Cluster,
        CLUSTER_RESOURCE_NAME,
        PatternType::Literal,
        AclOperation::DescribeConfigs,
    ));
    bindings.extend(config.default_bindings.iter().cloned());

    // Internal-topic prefixes: the application fully controls its internal
    // namespace, read-only identities may only inspect and consume it.
    for prefix in &ctx.internal_topic_prefixes {
        if ctx.read_only {
            for operation in READ_TOPIC_OPERATIONS {
                bindings.insert(AclBinding::allow(
                    ResourceType::Topic,
                    prefix.clone(),
                    PatternType::Prefixed,
                    operation,
                ));
            }
        } else {
            bindings.insert(AclBinding::allow(
                ResourceType::Topic,
                prefix.clone(),
                PatternType::Prefixed,
                AclOperation::All,
            ));
        }
    }

    if !ctx.read_only {
        for prefix in &ctx.consumer_group_prefixes {
            bindings.insert(AclBinding::allow(
                ResourceType::Group,
                prefix.clone(),
                PatternType::Prefixed,
                AclOperation::All,
            ));
        }
        for prefix in &ctx.transaction_id_prefixes {
            for operation in [AclOperation::Describe, AclOperation::Write] {
                bindings.insert(AclBinding::allow(
                    ResourceType::TransactionalId,
                    prefix.clone(),
                    PatternType::Prefixed,
                    operation,
                ));
            }
        }
    }

    // Owned and produced topics get the write set. Internal topics are
    // already covered by the prefix grants above.
    for topic in non_internal(ctx.owned_topics.iter().chain(&ctx.producer_topics)) {
        let operations: &[AclOperation] = if ctx.read_only {
            &READ_TOPIC_OPERATIONS
        } else {
            &WRITE_TOPIC_OPERATIONS
        };
        grant_topic(&mut bindings, &topic.name, operations);
    }

    // Approved subscriptions get the read set, except commands topics:
    // issuing a command is producing, so subscribers write there.
    for topic in non_internal(ctx.subscribed_topics.iter()) {
        let operations: &[AclOperation] =
            if topic.topic_type == TopicType::Commands && !ctx.read_only {
                &WRITE_TOPIC_OPERATIONS
            } else {
                &READ_TOPIC_OPERATIONS
            };
        grant_topic(&mut bindings, &topic.name, operations);
    }

    bindings
}

fn non_internal<'a>(
    topics: impl Iterator<Item = &'a TopicMetadata>,
) -> impl Iterator<Item = &'a TopicMetadata> {
    topics.filter(|t| !t.is_internal())
}

fn grant_topic(bindings: &mut BTreeSet<AclBinding>, name: &str, operations: &[AclOperation]) {
    for operation in operations {
        bindings.insert(AclBinding::allow(
            ResourceType::Topic,
            name,
            PatternType::Literal,
            *operation,
        ));
    }
}
