//! Change-set computation and replay.

use crate::applier::ChangeApplier;
use crate::change::{Change, StagingResult};
use std::collections::{BTreeMap, BTreeSet};
use steward_types::{
    ApplicationId, EnvironmentId, GovernanceError, GovernanceResult, MetadataReader, TopicMetadata,
};
use tracing::{debug, info, warn};

/// A computed promotion of one application's footprint from a source
/// environment to a target environment.
pub struct Staging {
    application_id: ApplicationId,
    source_environment: EnvironmentId,
    target_environment: EnvironmentId,
    changes: Vec<Change>,
}

impl Staging {
    /// Diffs the application's footprint between the two environments and
    /// computes the ordered change-set promoting source to target.
    ///
    /// If `filter` is given (a change-set from a prior build, round-tripped
    /// through a client), the computed list is first augmented with any
    /// placeholder matching a filtered topic CREATE, then intersected with
    /// the filter by structural equality.
    ///
    /// Cross-environment read failures propagate; everything detected as
    /// invalid becomes a permanently-failing placeholder instead.
    pub async fn build(
        application_id: ApplicationId,
        source_environment: EnvironmentId,
        source: &dyn MetadataReader,
        target_environment: EnvironmentId,
        target: &dyn MetadataReader,
        filter: Option<&[Change]>,
    ) -> GovernanceResult<Self> {
        let mut source_topics: Vec<TopicMetadata> = source
            .list_topics()
            .await?
            .into_iter()
            .filter(|t| t.owner_application_id == application_id)
            .collect();
        source_topics.sort_by(|a, b| a.name.cmp(&b.name));

        let target_topics: BTreeMap<String, TopicMetadata> = target
            .list_topics()
            .await?
            .into_iter()
            .filter(|t| t.owner_application_id == application_id)
            .map(|t| (t.name.clone(), t))
            .collect();

        let mut changes = Vec::new();
        // Topics whose first schema version is already bundled into their
        // compound create and must not reappear in the schema diff.
        let mut bundled_first_version: BTreeSet<String> = BTreeSet::new();
        // Topics whose create was replaced by a placeholder; they get no
        // follow-up changes, the placeholder stands for the whole topic.
        let mut blocked: BTreeSet<String> = BTreeSet::new();

        // Topic diff by name: creations and settings updates.
        for topic in &source_topics {
            match target_topics.get(&topic.name) {
                None => {
                    let change = create_change(topic, source, &mut bundled_first_version).await?;
                    if matches!(change, Change::AlwaysFails { .. }) {
                        blocked.insert(topic.name.clone());
                    }
                    changes.push(change);
                }
                Some(existing) => {
                    if let Some(updated) = settings_update(existing, topic) {
                        changes.push(Change::UpdateTopic { topic: updated });
                    }
                }
            }
        }

        // Topics present only on the target are retired.
        for name in target_topics.keys() {
            if !source_topics.iter().any(|t| &t.name == name) {
                changes.push(Change::DeleteTopic {
                    topic_name: name.clone(),
                });
            }
        }

        // Subscription diff by (application, topic) identity. There is no
        // update case: a subscription either exists on the target or not.
        let source_subscriptions = source
            .subscriptions_of_application(&application_id)
            .await?;
        let target_subscriptions = target
            .subscriptions_of_application(&application_id)
            .await?;

        for subscription in &source_subscriptions {
            let exists = target_subscriptions
                .iter()
                .any(|s| s.topic_name == subscription.topic_name);
            if !exists {
                changes.push(Change::Subscribe {
                    subscription: subscription.clone(),
                });
            }
        }
        for subscription in &target_subscriptions {
            let exists = source_subscriptions
                .iter()
                .any(|s| s.topic_name == subscription.topic_name);
            if !exists {
                changes.push(Change::Unsubscribe {
                    topic_name: subscription.topic_name.clone(),
                    application_id: application_id.clone(),
                });
            }
        }

        // Ordered schema-version diff per owned topic.
        for topic in &source_topics {
            if blocked.contains(&topic.name) {
                continue;
            }
            let source_versions = source.topic_schema_versions(&topic.name).await?;
            let target_versions: BTreeSet<u32> = target
                .topic_schema_versions(&topic.name)
                .await?
                .iter()
                .map(|s| s.schema_version)
                .collect();

            let bundled = bundled_first_version.contains(&topic.name);
            for (index, schema) in source_versions.iter().enumerate() {
                if bundled && index == 0 {
                    continue;
                }
                if !target_versions.contains(&schema.schema_version) {
                    changes.push(Change::PublishSchemaVersion {
                        schema: schema.clone(),
                    });
                }
            }
        }

        if let Some(filter) = filter {
            changes = apply_filter(changes, filter);
        }

        info!(
            "staging for '{}' from '{}' to '{}': {} change(s)",
            application_id,
            source_environment,
            target_environment,
            changes.len()
        );

        Ok(Self {
            application_id,
            source_environment,
            target_environment,
            changes,
        })
    }

    /// The application whose footprint is being promoted.
    pub fn application_id(&self) -> &ApplicationId {
        &self.application_id
    }

    /// The environment being promoted from.
    pub fn source_environment(&self) -> &EnvironmentId {
        &self.source_environment
    }

    /// The environment being promoted to.
    pub fn target_environment(&self) -> &EnvironmentId {
        &self.target_environment
    }

    /// The computed (possibly filtered) change-set, in application order.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Applies the change-set strictly in computed order.
    ///
    /// Never raises: every failure lands in a per-change result and later
    /// changes still run. Atomicity holds only within one change or
    /// compound, never across the batch, and nothing rolls back. A compound
    /// reports one result per sub-change; the first sub-change failure
    /// skips the remainder of that compound.
    pub async fn apply(&self, applier: &dyn ChangeApplier) -> Vec<StagingResult> {
        let mut results = Vec::with_capacity(self.changes.len());

        for change in &self.changes {
            match change {
                Change::Compound { changes } => {
                    let mut failed = false;
                    for sub in changes {
                        if failed {
                            results.push(StagingResult::failed(
                                sub.clone(),
                                "skipped: earlier change in compound failed",
                            ));
                            continue;
                        }
                        let result = apply_single(sub, applier).await;
                        failed = !result.is_success();
                        results.push(result);
                    }
                }
                other => results.push(apply_single(other, applier).await),
            }
        }

        let failures = results.iter().filter(|r| !r.is_success()).count();
        if failures > 0 {
            warn!(
                "staging apply for '{}' finished with {}/{} failure(s)",
                self.application_id,
                failures,
                results.len()
            );
        } else {
            debug!(
                "staging apply for '{}' finished, {} change(s) applied",
                self.application_id,
                results.len()
            );
        }

        results
    }
}

/// Computes the change creating one source topic on the target, or the
/// placeholder naming why it cannot be created.
async fn create_change(
    topic: &TopicMetadata,
    source: &dyn MetadataReader,
    bundled_first_version: &mut BTreeSet<String>,
) -> GovernanceResult<Change> {
    if topic.deprecated {
        return Ok(Change::AlwaysFails {
            topic_name: topic.name.clone(),
            reason: format!("topic '{}' is deprecated and cannot be staged", topic.name),
        });
    }

    let versions = source.topic_schema_versions(&topic.name).await?;
    if !topic.is_internal() && versions.is_empty() {
        return Ok(Change::AlwaysFails {
            topic_name: topic.name.clone(),
            reason: format!(
                "topic '{}' has no published schema version on the source environment",
                topic.name
            ),
        });
    }

    let params = source.topic_create_params(&topic.name).await?;
    let create = Change::CreateTopic {
        topic: topic.clone(),
        params,
    };

    if topic.is_internal() {
        return Ok(create);
    }

    // Non-internal topics never exist without a schema and their producer
    // grants, so all three land on the target as one unit.
    let mut changes = vec![create];
    changes.push(Change::PublishSchemaVersion {
        schema: versions[0].clone(),
    });
    for producer in &topic.producers {
        changes.push(Change::AddProducer {
            topic_name: topic.name.clone(),
            producer: producer.clone(),
        });
    }
    bundled_first_version.insert(topic.name.clone());

    Ok(Change::Compound { changes })
}

/// Returns the target topic with the source's governed settings if any of
/// them differ, or `None` if the settings already match.
fn settings_update(existing: &TopicMetadata, source: &TopicMetadata) -> Option<TopicMetadata> {
    let updated = TopicMetadata {
        description: source.description.clone(),
        deprecated: source.deprecated,
        deprecation_text: source.deprecation_text.clone(),
        eol_date: source.eol_date,
        subscription_approval_required: source.subscription_approval_required,
        ..existing.clone()
    };

    if &updated == existing {
        None
    } else {
        Some(updated)
    }
}

/// Intersects the computed list against a client-supplied filter.
///
/// Placeholders computed for a CREATE present in the filter are added to
/// the filter first, so a blocking reason discovered after the client's
/// original build still survives the intersection.
fn apply_filter(computed: Vec<Change>, filter: &[Change]) -> Vec<Change> {
    let mut augmented: Vec<Change> = filter.to_vec();
    for change in &computed {
        if let Change::AlwaysFails { topic_name, .. } = change {
            if augmented.iter().any(|f| f.creates_topic(topic_name))
                && !augmented.contains(change)
            {
                debug!("filter augmented with placeholder for topic '{}'", topic_name);
                augmented.push(change.clone());
            }
        }
    }

    computed
        .into_iter()
        .filter(|c| augmented.contains(c))
        .collect()
}

/// Applies one non-compound change.
async fn apply_single(change: &Change, applier: &dyn ChangeApplier) -> StagingResult {
    let applied: GovernanceResult<()> = match change {
        Change::CreateTopic { topic, params } => applier.create_topic(topic, params).await,
        Change::DeleteTopic { topic_name } => applier.delete_topic(topic_name).await,
        Change::UpdateTopic { topic } => applier.update_topic(topic).await,
        Change::Subscribe { subscription } => applier.subscribe(subscription).await,
        Change::Unsubscribe {
            topic_name,
            application_id,
        } => applier.unsubscribe(topic_name, application_id).await,
        Change::PublishSchemaVersion { schema } => applier.publish_schema_version(schema).await,
        Change::AddProducer {
            topic_name,
            producer,
        } => applier.add_producer(topic_name, producer).await,
        Change::RemoveProducer {
            topic_name,
            producer,
        } => applier.remove_producer(topic_name, producer).await,
        Change::ChangeOwner {
            topic_name,
            new_owner,
        } => applier.change_owner(topic_name, new_owner).await,
        Change::AlwaysFails { reason, .. } => {
            Err(GovernanceError::InvalidState(reason.clone()))
        }
        Change::Compound { .. } => Err(GovernanceError::InvalidArgument(
            "nested compound change".to_string(),
        )),
    };

    match applied {
        Ok(()) => StagingResult::succeeded(change.clone()),
        Err(e) => {
            warn!("staging change failed: {}", e);
            StagingResult::failed(change.clone(), e.to_string())
        }
    }
}
