//! Listener capability traits.
//!
//! A listener subscribes by implementing one or more of these traits and
//! registering with the [`ListenerRegistry`](crate::ListenerRegistry).
//! Every trait method must be implemented; a listener that does not care
//! about an event kind writes an explicit `Ok(())` body rather than relying
//! on an implicit opt-out, so non-interest is visible in the code.
//!
//! Handlers run after the triggering mutation has been durably persisted.
//! Returning an error marks reconciliation incomplete for that event and
//! aborts the remaining chain; it never unwinds the mutation.

use crate::event::{
    ApplicationEvent, OwnerRequestEvent, SubscriptionEvent, TopicCreatedEvent, TopicEvent,
    TopicOwnerChangedEvent, TopicProducerEvent, TopicSchemaAddedEvent,
};
use async_trait::async_trait;
use steward_types::GovernanceResult;

/// Reacts to topic lifecycle events.
#[async_trait]
pub trait TopicEventsListener: Send + Sync {
    /// A topic was created.
    async fn handle_topic_created(&self, event: &TopicCreatedEvent) -> GovernanceResult<()>;

    /// A topic was deleted.
    async fn handle_topic_deleted(&self, event: &TopicEvent) -> GovernanceResult<()>;

    /// A topic's governed settings changed (description, deprecation,
    /// subscription-approval-required flag).
    async fn handle_topic_settings_updated(&self, event: &TopicEvent) -> GovernanceResult<()>;

    /// A schema version was published.
    async fn handle_topic_schema_added(
        &self,
        event: &TopicSchemaAddedEvent,
    ) -> GovernanceResult<()>;

    /// A producer was granted access to the topic.
    async fn handle_producer_added(&self, event: &TopicProducerEvent) -> GovernanceResult<()>;

    /// A producer's access to the topic was revoked.
    async fn handle_producer_removed(&self, event: &TopicProducerEvent) -> GovernanceResult<()>;

    /// The topic changed owner.
    async fn handle_topic_owner_changed(
        &self,
        event: &TopicOwnerChangedEvent,
    ) -> GovernanceResult<()>;
}

/// Reacts to subscription lifecycle events.
#[async_trait]
pub trait SubscriptionEventsListener: Send + Sync {
    /// A subscription was created.
    async fn handle_subscription_created(&self, event: &SubscriptionEvent) -> GovernanceResult<()>;

    /// A subscription changed state (e.g. pending to approved).
    async fn handle_subscription_updated(&self, event: &SubscriptionEvent) -> GovernanceResult<()>;

    /// A subscription was deleted.
    async fn handle_subscription_deleted(&self, event: &SubscriptionEvent) -> GovernanceResult<()>;
}

/// Reacts to application lifecycle events.
#[async_trait]
pub trait ApplicationEventsListener: Send + Sync {
    /// An application was registered in the environment.
    async fn handle_application_registered(&self, event: &ApplicationEvent)
        -> GovernanceResult<()>;

    /// An application's credentials (certificate) changed.
    async fn handle_authentication_changed(&self, event: &ApplicationEvent)
        -> GovernanceResult<()>;
}

/// Reacts to application ownership request events.
#[async_trait]
pub trait OwnerRequestEventsListener: Send + Sync {
    /// An ownership request was submitted.
    async fn handle_owner_request_created(&self, event: &OwnerRequestEvent)
        -> GovernanceResult<()>;

    /// An ownership request changed state.
    async fn handle_owner_request_updated(&self, event: &OwnerRequestEvent)
        -> GovernanceResult<()>;

    /// An ownership request was canceled by the requester.
    async fn handle_owner_request_canceled(
        &self,
        event: &OwnerRequestEvent,
    ) -> GovernanceResult<()>;
}
