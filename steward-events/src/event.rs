//! Typed domain events.
//!
//! Each event is a post-mutation snapshot: it carries the metadata as it
//! stands after the mutation plus the captured [`EventContext`]. Events are
//! created per mutation and discarded after the listener chain completes;
//! they are never persisted.

use crate::context::EventContext;
use serde::Serialize;
use steward_types::{
    ApplicationId, ApplicationMetadata, ApplicationOwnerRequest, SchemaMetadata,
    SubscriptionMetadata, TopicCreateParams, TopicMetadata,
};

/// A topic-level event (deletion, settings update).
#[derive(Debug, Clone, Serialize)]
pub struct TopicEvent {
    /// Ambient context captured at sink creation.
    pub context: EventContext,
    /// The topic after the mutation.
    pub metadata: TopicMetadata,
}

/// A topic was created; also carries its physical creation parameters.
#[derive(Debug, Clone, Serialize)]
pub struct TopicCreatedEvent {
    pub context: EventContext,
    /// The freshly created topic.
    pub metadata: TopicMetadata,
    /// Partition count and configs the topic was created with.
    pub params: TopicCreateParams,
}

/// A producer was added to or removed from a topic.
#[derive(Debug, Clone, Serialize)]
pub struct TopicProducerEvent {
    pub context: EventContext,
    /// The topic after the producer list changed.
    pub metadata: TopicMetadata,
    /// The producer that was added or removed.
    pub producer: ApplicationId,
}

/// A topic changed owner.
#[derive(Debug, Clone, Serialize)]
pub struct TopicOwnerChangedEvent {
    pub context: EventContext,
    /// The topic with its new owner.
    pub metadata: TopicMetadata,
    /// The owner before the change.
    pub previous_owner: ApplicationId,
}

/// A schema version was published for a topic.
#[derive(Debug, Clone, Serialize)]
pub struct TopicSchemaAddedEvent {
    pub context: EventContext,
    /// The topic the schema belongs to.
    pub metadata: TopicMetadata,
    /// The published schema version.
    pub schema: SchemaMetadata,
}

/// A subscription was created, updated or deleted.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionEvent {
    pub context: EventContext,
    /// The subscription after the mutation.
    pub metadata: SubscriptionMetadata,
}

/// An application was registered or its authentication changed.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationEvent {
    pub context: EventContext,
    /// The application's metadata after the mutation.
    pub metadata: ApplicationMetadata,
}

/// An ownership request was created, updated or canceled.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerRequestEvent {
    pub context: EventContext,
    /// The request after the mutation.
    pub metadata: ApplicationOwnerRequest,
}
