//! Event sinks and sequential listener dispatch.

use crate::context::{ContextProvider, EventContext};
use crate::event::{
    ApplicationEvent, OwnerRequestEvent, SubscriptionEvent, TopicCreatedEvent, TopicEvent,
    TopicOwnerChangedEvent, TopicProducerEvent, TopicSchemaAddedEvent,
};
use crate::listener::{
    ApplicationEventsListener, OwnerRequestEventsListener, SubscriptionEventsListener,
    TopicEventsListener,
};
use futures::future::BoxFuture;
use std::sync::Arc;
use steward_types::{
    ApplicationId, ApplicationMetadata, ApplicationOwnerRequest, EnvironmentId, GovernanceError,
    GovernanceResult, SchemaMetadata, SubscriptionMetadata, TopicCreateParams, TopicMetadata,
};
use tracing::{debug, error};

/// Ordered listener lists, one per capability.
///
/// Registration order is dispatch order; listeners registered first observe
/// and complete every event before later ones start.
#[derive(Default)]
pub struct ListenerRegistry {
    topic: Vec<Arc<dyn TopicEventsListener>>,
    subscription: Vec<Arc<dyn SubscriptionEventsListener>>,
    application: Vec<Arc<dyn ApplicationEventsListener>>,
    owner_request: Vec<Arc<dyn OwnerRequestEventsListener>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a topic listener at the end of the chain.
    pub fn register_topic_listener(&mut self, listener: Arc<dyn TopicEventsListener>) {
        self.topic.push(listener);
    }

    /// Registers a subscription listener at the end of the chain.
    pub fn register_subscription_listener(
        &mut self,
        listener: Arc<dyn SubscriptionEventsListener>,
    ) {
        self.subscription.push(listener);
    }

    /// Registers an application listener at the end of the chain.
    pub fn register_application_listener(&mut self, listener: Arc<dyn ApplicationEventsListener>) {
        self.application.push(listener);
    }

    /// Registers an owner-request listener at the end of the chain.
    pub fn register_owner_request_listener(
        &mut self,
        listener: Arc<dyn OwnerRequestEventsListener>,
    ) {
        self.owner_request.push(listener);
    }
}

/// Factory for event sinks.
///
/// One bus serves all environments; the ambient context is captured per sink
/// through the injected [`ContextProvider`].
pub struct EventBus {
    registry: Arc<ListenerRegistry>,
    context_provider: Arc<dyn ContextProvider>,
}

impl EventBus {
    /// Creates a bus over a fixed listener registry.
    pub fn new(registry: ListenerRegistry, context_provider: Arc<dyn ContextProvider>) -> Self {
        Self {
            registry: Arc::new(registry),
            context_provider,
        }
    }

    /// Creates a sink bound to `environment`, capturing the current ambient
    /// context now. Everything emitted through the sink carries this
    /// snapshot, regardless of which thread later runs the listeners.
    pub fn new_sink(&self, environment: EnvironmentId) -> EventSink {
        let context = self.context_provider.current(&environment);
        EventSink {
            context,
            registry: Arc::clone(&self.registry),
        }
    }
}

/// Emits post-mutation events to the registered listeners.
///
/// Each `handle_*` call suspends for the full sequential listener chain.
/// Unrelated sink invocations are not ordered against one another.
pub struct EventSink {
    context: EventContext,
    registry: Arc<ListenerRegistry>,
}

impl EventSink {
    /// Returns the context snapshot captured at sink creation.
    pub fn context(&self) -> &EventContext {
        &self.context
    }

    // ── Topic events ─────────────────────────────────────────────

    /// A topic was created.
    pub async fn handle_topic_created(
        &self,
        metadata: TopicMetadata,
        params: TopicCreateParams,
    ) -> GovernanceResult<()> {
        let event = TopicCreatedEvent {
            context: self.context.clone(),
            metadata,
            params,
        };
        let chain = self
            .registry
            .topic
            .iter()
            .map(|l| l.handle_topic_created(&event))
            .collect();
        dispatch("topic-created", chain).await
    }

    /// A topic was deleted.
    pub async fn handle_topic_deleted(&self, metadata: TopicMetadata) -> GovernanceResult<()> {
        let event = self.topic_event(metadata);
        let chain = self
            .registry
            .topic
            .iter()
            .map(|l| l.handle_topic_deleted(&event))
            .collect();
        dispatch("topic-deleted", chain).await
    }

    /// A topic's governed settings changed.
    pub async fn handle_topic_settings_updated(
        &self,
        metadata: TopicMetadata,
    ) -> GovernanceResult<()> {
        let event = self.topic_event(metadata);
        let chain = self
            .registry
            .topic
            .iter()
            .map(|l| l.handle_topic_settings_updated(&event))
            .collect();
        dispatch("topic-settings-updated", chain).await
    }

    /// A schema version was published.
    pub async fn handle_topic_schema_added(
        &self,
        metadata: TopicMetadata,
        schema: SchemaMetadata,
    ) -> GovernanceResult<()> {
        let event = TopicSchemaAddedEvent {
            context: self.context.clone(),
            metadata,
            schema,
        };
        let chain = self
            .registry
            .topic
            .iter()
            .map(|l| l.handle_topic_schema_added(&event))
            .collect();
        dispatch("topic-schema-added", chain).await
    }

    /// A producer was added to a topic.
    pub async fn handle_producer_added(
        &self,
        metadata: TopicMetadata,
        producer: ApplicationId,
    ) -> GovernanceResult<()> {
        let event = TopicProducerEvent {
            context: self.context.clone(),
            metadata,
            producer,
        };
        let chain = self
            .registry
            .topic
            .iter()
            .map(|l| l.handle_producer_added(&event))
            .collect();
        dispatch("producer-added", chain).await
    }

    /// A producer was removed from a topic.
    pub async fn handle_producer_removed(
        &self,
        metadata: TopicMetadata,
        producer: ApplicationId,
    ) -> GovernanceResult<()> {
        let event = TopicProducerEvent {
            context: self.context.clone(),
            metadata,
            producer,
        };
        let chain = self
            .registry
            .topic
            .iter()
            .map(|l| l.handle_producer_removed(&event))
            .collect();
        dispatch("producer-removed", chain).await
    }

    /// A topic changed owner.
    pub async fn handle_topic_owner_changed(
        &self,
        metadata: TopicMetadata,
        previous_owner: ApplicationId,
    ) -> GovernanceResult<()> {
        let event = TopicOwnerChangedEvent {
            context: self.context.clone(),
            metadata,
            previous_owner,
        };
        let chain = self
            .registry
            .topic
            .iter()
            .map(|l| l.handle_topic_owner_changed(&event))
            .collect();
        dispatch("topic-owner-changed", chain).await
    }

    // ── Subscription events ──────────────────────────────────────

    /// A subscription was created.
    pub async fn handle_subscription_created(
        &self,
        metadata: SubscriptionMetadata,
    ) -> GovernanceResult<()> {
        let event = self.subscription_event(metadata);
        let chain = self
            .registry
            .subscription
            .iter()
            .map(|l| l.handle_subscription_created(&event))
            .collect();
        dispatch("subscription-created", chain).await
    }

    /// A subscription changed state.
    pub async fn handle_subscription_updated(
        &self,
        metadata: SubscriptionMetadata,
    ) -> GovernanceResult<()> {
        let event = self.subscription_event(metadata);
        let chain = self
            .registry
            .subscription
            .iter()
            .map(|l| l.handle_subscription_updated(&event))
            .collect();
        dispatch("subscription-updated", chain).await
    }

    /// A subscription was deleted.
    pub async fn handle_subscription_deleted(
        &self,
        metadata: SubscriptionMetadata,
    ) -> GovernanceResult<()> {
        let event = self.subscription_event(metadata);
        let chain = self
            .registry
            .subscription
            .iter()
            .map(|l| l.handle_subscription_deleted(&event))
            .collect();
        dispatch("subscription-deleted", chain).await
    }

    // ── Application events ───────────────────────────────────────

    /// An application was registered.
    pub async fn handle_application_registered(
        &self,
        metadata: ApplicationMetadata,
    ) -> GovernanceResult<()> {
        let event = self.application_event(metadata);
        let chain = self
            .registry
            .application
            .iter()
            .map(|l| l.handle_application_registered(&event))
            .collect();
        dispatch("application-registered", chain).await
    }

    /// An application's credentials changed.
    pub async fn handle_authentication_changed(
        &self,
        metadata: ApplicationMetadata,
    ) -> GovernanceResult<()> {
        let event = self.application_event(metadata);
        let chain = self
            .registry
            .application
            .iter()
            .map(|l| l.handle_authentication_changed(&event))
            .collect();
        dispatch("authentication-changed", chain).await
    }

    // ── Owner-request events ─────────────────────────────────────

    /// An ownership request was submitted.
    pub async fn handle_owner_request_created(
        &self,
        metadata: ApplicationOwnerRequest,
    ) -> GovernanceResult<()> {
        let event = self.owner_request_event(metadata);
        let chain = self
            .registry
            .owner_request
            .iter()
            .map(|l| l.handle_owner_request_created(&event))
            .collect();
        dispatch("owner-request-created", chain).await
    }

    /// An ownership request changed state.
    pub async fn handle_owner_request_updated(
        &self,
        metadata: ApplicationOwnerRequest,
    ) -> GovernanceResult<()> {
        let event = self.owner_request_event(metadata);
        let chain = self
            .registry
            .owner_request
            .iter()
            .map(|l| l.handle_owner_request_updated(&event))
            .collect();
        dispatch("owner-request-updated", chain).await
    }

    /// An ownership request was canceled.
    pub async fn handle_owner_request_canceled(
        &self,
        metadata: ApplicationOwnerRequest,
    ) -> GovernanceResult<()> {
        let event = self.owner_request_event(metadata);
        let chain = self
            .registry
            .owner_request
            .iter()
            .map(|l| l.handle_owner_request_canceled(&event))
            .collect();
        dispatch("owner-request-canceled", chain).await
    }

    fn topic_event(&self, metadata: TopicMetadata) -> TopicEvent {
        TopicEvent {
            context: self.context.clone(),
            metadata,
        }
    }

    fn subscription_event(&self, metadata: SubscriptionMetadata) -> SubscriptionEvent {
        SubscriptionEvent {
            context: self.context.clone(),
            metadata,
        }
    }

    fn application_event(&self, metadata: ApplicationMetadata) -> ApplicationEvent {
        ApplicationEvent {
            context: self.context.clone(),
            metadata,
        }
    }

    fn owner_request_event(&self, metadata: ApplicationOwnerRequest) -> OwnerRequestEvent {
        OwnerRequestEvent {
            context: self.context.clone(),
            metadata,
        }
    }
}

/// Runs a listener chain strictly sequentially.
///
/// The futures are created lazily-polled: none does any work until awaited,
/// so listener N+1 starts only once listener N has resolved. An explicit
/// loop keeps stack depth bounded regardless of chain length. The first
/// failure aborts the remaining chain.
async fn dispatch(
    event_kind: &str,
    chain: Vec<BoxFuture<'_, GovernanceResult<()>>>,
) -> GovernanceResult<()> {
    let total = chain.len();
    for (position, handler) in chain.into_iter().enumerate() {
        if let Err(e) = handler.await {
            error!(
                "listener {}/{} failed for event '{}': {}; aborting remaining chain",
                position + 1,
                total,
                event_kind,
                e
            );
            return Err(GovernanceError::Reconciliation {
                listener: format!("{event_kind}#{position}"),
                message: e.to_string(),
            });
        }
    }
    debug!("event '{}' dispatched to {} listener(s)", event_kind, total);
    Ok(())
}
