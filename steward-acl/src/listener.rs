//! The ACL reconciliation listener.
//!
//! Registered on the event bus of every environment. After each relevant
//! mutation it rebuilds the affected application's identity context from
//! current state, recomputes the full binding set and pushes it to the
//! cluster. Recomputation is wholesale and idempotent, so replays and
//! overlapping events converge to the same ACLs.

use crate::deriver::{compute_required_bindings, AclConfig};
use crate::identity::{AclIdentity, IdentityContext};
use crate::pusher::AclPusher;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use steward_events::{
    ApplicationEvent, ApplicationEventsListener, OwnerRequestEvent, OwnerRequestEventsListener,
    SubscriptionEvent, SubscriptionEventsListener, TopicCreatedEvent, TopicEvent,
    TopicEventsListener, TopicOwnerChangedEvent, TopicProducerEvent, TopicSchemaAddedEvent,
};
use steward_types::{
    ApplicationId, GovernanceResult, MetadataReader, SubscriptionState, TopicMetadata,
};
use tracing::{debug, info};

/// Recomputes and pushes an application's ACLs after relevant events.
///
/// Application principals are always full-access, so the contexts built
/// here never set `read_only`. Read-only identities exist only for
/// tooling credentials issued by the credential service, which calls
/// [`compute_required_bindings`] with its own context.
pub struct UpdateAclListener {
    reader: Arc<dyn MetadataReader>,
    pusher: Arc<dyn AclPusher>,
    config: AclConfig,
}

impl UpdateAclListener {
    /// Creates the listener for one environment.
    pub fn new(
        reader: Arc<dyn MetadataReader>,
        pusher: Arc<dyn AclPusher>,
        config: AclConfig,
    ) -> Self {
        Self {
            reader,
            pusher,
            config,
        }
    }

    /// Rebuilds the identity context of an application from current state.
    ///
    /// Returns `None` if the application is not registered in this
    /// environment or holds no credentials here (nothing to push).
    async fn build_identity(
        &self,
        application_id: &ApplicationId,
    ) -> GovernanceResult<Option<AclIdentity>> {
        let Some(app) = self.reader.application_metadata(application_id).await? else {
            debug!("application '{}' not registered here, skipping ACLs", application_id);
            return Ok(None);
        };
        let Some(principal) = app.kafka_principal else {
            debug!("application '{}' has no principal here, skipping ACLs", application_id);
            return Ok(None);
        };

        let topics = self.reader.list_topics().await?;
        let owned_topics: Vec<TopicMetadata> = topics
            .iter()
            .filter(|t| &t.owner_application_id == application_id)
            .cloned()
            .collect();
        let producer_topics: Vec<TopicMetadata> = topics
            .iter()
            .filter(|t| {
                &t.owner_application_id != application_id
                    && t.producers.contains(application_id)
            })
            .cloned()
            .collect();

        let mut subscribed_topics = Vec::new();
        for subscription in self
            .reader
            .subscriptions_of_application(application_id)
            .await?
        {
            if subscription.state != SubscriptionState::Approved {
                continue;
            }
            if let Some(topic) = self.reader.get_topic(&subscription.topic_name).await? {
                subscribed_topics.push(topic);
            }
        }

        let context = IdentityContext {
            owned_topics,
            producer_topics,
            subscribed_topics,
            internal_topic_prefixes: app.internal_topic_prefixes,
            consumer_group_prefixes: app.consumer_group_prefixes,
            transaction_id_prefixes: app.transaction_id_prefixes,
            read_only: false,
        };

        Ok(Some(AclIdentity {
            principal,
            bindings: compute_required_bindings(&context, &self.config),
        }))
    }

    /// Recomputes and pushes the ACLs of one application.
    async fn reconcile(&self, application_id: &ApplicationId) -> GovernanceResult<()> {
        if let Some(identity) = self.build_identity(application_id).await? {
            info!(
                "updating ACLs for application '{}' (principal '{}', {} bindings)",
                application_id,
                identity.principal,
                identity.bindings.len()
            );
            self.pusher.update_user_acls(&identity).await?;
        }
        Ok(())
    }

    /// Recomputes every application touching a topic: owner, additional
    /// producers, and approved subscribers.
    async fn reconcile_topic(&self, topic: &TopicMetadata) -> GovernanceResult<()> {
        let mut applications = BTreeSet::new();
        applications.insert(topic.owner_application_id.clone());
        applications.extend(topic.producers.iter().cloned());
        for subscription in self.reader.subscriptions_for_topic(&topic.name).await? {
            if subscription.state == SubscriptionState::Approved {
                applications.insert(subscription.client_application_id);
            }
        }

        for application_id in &applications {
            self.reconcile(application_id).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl TopicEventsListener for UpdateAclListener {
    async fn handle_topic_created(&self, event: &TopicCreatedEvent) -> GovernanceResult<()> {
        self.reconcile_topic(&event.metadata).await
    }

    async fn handle_topic_deleted(&self, event: &TopicEvent) -> GovernanceResult<()> {
        self.reconcile_topic(&event.metadata).await
    }

    async fn handle_topic_settings_updated(&self, _event: &TopicEvent) -> GovernanceResult<()> {
        // Settings changes alone grant nothing; subscription-state events
        // follow if the approval flip releases pending subscribers.
        Ok(())
    }

    async fn handle_topic_schema_added(
        &self,
        _event: &TopicSchemaAddedEvent,
    ) -> GovernanceResult<()> {
        Ok(())
    }

    async fn handle_producer_added(&self, event: &TopicProducerEvent) -> GovernanceResult<()> {
        self.reconcile(&event.producer).await
    }

    async fn handle_producer_removed(&self, event: &TopicProducerEvent) -> GovernanceResult<()> {
        self.reconcile(&event.producer).await
    }

    async fn handle_topic_owner_changed(
        &self,
        event: &TopicOwnerChangedEvent,
    ) -> GovernanceResult<()> {
        // Previous owner loses the write set, new owner gains it.
        self.reconcile(&event.previous_owner).await?;
        self.reconcile(&event.metadata.owner_application_id).await
    }
}

#[async_trait]
impl SubscriptionEventsListener for UpdateAclListener {
    async fn handle_subscription_created(&self, event: &SubscriptionEvent) -> GovernanceResult<()> {
        self.reconcile(&event.metadata.client_application_id).await
    }

    async fn handle_subscription_updated(&self, event: &SubscriptionEvent) -> GovernanceResult<()> {
        self.reconcile(&event.metadata.client_application_id).await
    }

    async fn handle_subscription_deleted(&self, event: &SubscriptionEvent) -> GovernanceResult<()> {
        self.reconcile(&event.metadata.client_application_id).await
    }
}

#[async_trait]
impl ApplicationEventsListener for UpdateAclListener {
    async fn handle_application_registered(
        &self,
        event: &ApplicationEvent,
    ) -> GovernanceResult<()> {
        self.reconcile(&event.metadata.application_id).await
    }

    async fn handle_authentication_changed(
        &self,
        event: &ApplicationEvent,
    ) -> GovernanceResult<()> {
        // Rotation to a new principal: push the full set for the new one.
        // Clearing the superseded principal is done by the credential
        // service through `AclPusher::remove_user_acls`, since only it
        // knows the old principal name.
        self.reconcile(&event.metadata.application_id).await
    }
}

#[async_trait]
impl OwnerRequestEventsListener for UpdateAclListener {
    async fn handle_owner_request_created(
        &self,
        _event: &OwnerRequestEvent,
    ) -> GovernanceResult<()> {
        // Ownership requests never touch cluster ACLs.
        Ok(())
    }

    async fn handle_owner_request_updated(
        &self,
        _event: &OwnerRequestEvent,
    ) -> GovernanceResult<()> {
        Ok(())
    }

    async fn handle_owner_request_canceled(
        &self,
        _event: &OwnerRequestEvent,
    ) -> GovernanceResult<()> {
        Ok(())
    }
}
