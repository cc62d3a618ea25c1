//! The target-environment apply surface.

use async_trait::async_trait;
use steward_types::{
    ApplicationId, GovernanceResult, SchemaMetadata, SubscriptionMetadata, TopicCreateParams,
    TopicMetadata,
};

/// Applies staging changes on the target environment.
///
/// Implemented by the target's domain services: each method performs an
/// ordinary mutation, persisting through the log-backed stores and emitting
/// the corresponding event through the bus, exactly as a direct user
/// request would.
#[async_trait]
pub trait ChangeApplier: Send + Sync {
    /// Creates a topic.
    async fn create_topic(
        &self,
        topic: &TopicMetadata,
        params: &TopicCreateParams,
    ) -> GovernanceResult<()>;

    /// Deletes a topic.
    async fn delete_topic(&self, topic_name: &str) -> GovernanceResult<()>;

    /// Updates a topic's governed settings.
    async fn update_topic(&self, topic: &TopicMetadata) -> GovernanceResult<()>;

    /// Creates a subscription.
    async fn subscribe(&self, subscription: &SubscriptionMetadata) -> GovernanceResult<()>;

    /// Deletes an application's subscription to a topic.
    async fn unsubscribe(
        &self,
        topic_name: &str,
        application_id: &ApplicationId,
    ) -> GovernanceResult<()>;

    /// Publishes one schema version.
    async fn publish_schema_version(&self, schema: &SchemaMetadata) -> GovernanceResult<()>;

    /// Authorizes an additional producer.
    async fn add_producer(
        &self,
        topic_name: &str,
        producer: &ApplicationId,
    ) -> GovernanceResult<()>;

    /// Revokes an additional producer.
    async fn remove_producer(
        &self,
        topic_name: &str,
        producer: &ApplicationId,
    ) -> GovernanceResult<()>;

    /// Transfers topic ownership.
    async fn change_owner(
        &self,
        topic_name: &str,
        new_owner: &ApplicationId,
    ) -> GovernanceResult<()>;
}
