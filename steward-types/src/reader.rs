//! Read accessors owned by peripheral domain services.
//!
//! The staging engine and the ACL reconciliation path read metadata through
//! this trait; the implementations live with the domain services (topic,
//! subscription, application and schema services) outside the core. One
//! reader is bound to one environment.

use crate::{
    ApplicationId, ApplicationMetadata, GovernanceResult, SchemaMetadata, SubscriptionMetadata,
    TopicCreateParams, TopicMetadata,
};
use async_trait::async_trait;

/// Environment-bound metadata read access.
#[async_trait]
pub trait MetadataReader: Send + Sync {
    /// Lists all topics in the environment.
    async fn list_topics(&self) -> GovernanceResult<Vec<TopicMetadata>>;

    /// Looks up one topic by name.
    async fn get_topic(&self, topic_name: &str) -> GovernanceResult<Option<TopicMetadata>>;

    /// Lists all subscriptions to a topic.
    async fn subscriptions_for_topic(
        &self,
        topic_name: &str,
    ) -> GovernanceResult<Vec<SubscriptionMetadata>>;

    /// Lists all subscriptions held by an application.
    async fn subscriptions_of_application(
        &self,
        application_id: &ApplicationId,
    ) -> GovernanceResult<Vec<SubscriptionMetadata>>;

    /// Returns an application's per-environment metadata, if registered.
    async fn application_metadata(
        &self,
        application_id: &ApplicationId,
    ) -> GovernanceResult<Option<ApplicationMetadata>>;

    /// Resolves the physical creation parameters of an existing topic.
    async fn topic_create_params(&self, topic_name: &str) -> GovernanceResult<TopicCreateParams>;

    /// Returns a topic's published schema versions in version order.
    async fn topic_schema_versions(
        &self,
        topic_name: &str,
    ) -> GovernanceResult<Vec<SchemaMetadata>>;
}
