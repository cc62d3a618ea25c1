use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use steward_events::{
    ApplicationEvent, ContextProvider, EventBus, EventContext, EventSink, ListenerRegistry,
    OwnerRequestEvent, OwnerRequestEventsListener, SubscriptionEvent, SubscriptionEventsListener,
    SystemContextProvider, TopicCreatedEvent, TopicEvent, TopicEventsListener,
    TopicOwnerChangedEvent, TopicProducerEvent, TopicSchemaAddedEvent,
};
use steward_types::{
    ApplicationId, EnvironmentId, GovernanceError, GovernanceResult, SubscriptionMetadata,
    SubscriptionState, TopicCreateParams, TopicMetadata, TopicType,
};

fn make_topic(name: &str, owner: &str) -> TopicMetadata {
    TopicMetadata {
        name: name.to_string(),
        topic_type: TopicType::Events,
        description: None,
        owner_application_id: ApplicationId::from(owner),
        deprecated: false,
        deprecation_text: None,
        eol_date: None,
        subscription_approval_required: false,
        producers: Vec::new(),
    }
}

fn make_subscription(id: &str, client: &str, topic: &str, state: SubscriptionState) -> SubscriptionMetadata {
    SubscriptionMetadata {
        id: id.to_string(),
        client_application_id: ApplicationId::from(client),
        topic_name: topic.to_string(),
        state,
        description: None,
    }
}

/// Records every observed topic event as "name:event", optionally delaying
/// or failing first.
struct RecordingListener {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
    fail: bool,
}

impl RecordingListener {
    fn new(name: &'static str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name,
            log,
            delay: None,
            fail: false,
        }
    }

    fn delayed(name: &'static str, log: Arc<Mutex<Vec<String>>>, delay: Duration) -> Self {
        Self {
            name,
            log,
            delay: Some(delay),
            fail: false,
        }
    }

    fn failing(name: &'static str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name,
            log,
            delay: None,
            fail: true,
        }
    }

    async fn record(&self, event: &str) -> GovernanceResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.log.lock().unwrap().push(format!("{}:{event}", self.name));
        if self.fail {
            return Err(GovernanceError::InvalidState(format!(
                "{} refuses {event}",
                self.name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TopicEventsListener for RecordingListener {
    async fn handle_topic_created(&self, _event: &TopicCreatedEvent) -> GovernanceResult<()> {
        self.record("created").await
    }

    async fn handle_topic_deleted(&self, _event: &TopicEvent) -> GovernanceResult<()> {
        self.record("deleted").await
    }

    async fn handle_topic_settings_updated(&self, _event: &TopicEvent) -> GovernanceResult<()> {
        self.record("settings-updated").await
    }

    async fn handle_topic_schema_added(
        &self,
        _event: &TopicSchemaAddedEvent,
    ) -> GovernanceResult<()> {
        self.record("schema-added").await
    }

    async fn handle_producer_added(&self, _event: &TopicProducerEvent) -> GovernanceResult<()> {
        self.record("producer-added").await
    }

    async fn handle_producer_removed(&self, _event: &TopicProducerEvent) -> GovernanceResult<()> {
        self.record("producer-removed").await
    }

    async fn handle_topic_owner_changed(
        &self,
        _event: &TopicOwnerChangedEvent,
    ) -> GovernanceResult<()> {
        self.record("owner-changed").await
    }
}

fn make_bus(registry: ListenerRegistry) -> EventBus {
    EventBus::new(registry, Arc::new(SystemContextProvider))
}

fn make_sink(registry: ListenerRegistry) -> EventSink {
    make_bus(registry).new_sink(EnvironmentId::from("dev"))
}

// ── Dispatch order ───────────────────────────────────────────────

#[tokio::test]
async fn listeners_run_in_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ListenerRegistry::new();
    registry.register_topic_listener(Arc::new(RecordingListener::new("a", Arc::clone(&log))));
    registry.register_topic_listener(Arc::new(RecordingListener::new("b", Arc::clone(&log))));
    registry.register_topic_listener(Arc::new(RecordingListener::new("c", Arc::clone(&log))));

    let sink = make_sink(registry);
    sink.handle_topic_deleted(make_topic("t1", "app-1")).await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["a:deleted", "b:deleted", "c:deleted"]
    );
}

#[tokio::test(start_paused = true)]
async fn later_listener_waits_for_earlier_one() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ListenerRegistry::new();
    // If the chain ran concurrently, the fast listener would finish first.
    registry.register_topic_listener(Arc::new(RecordingListener::delayed(
        "slow",
        Arc::clone(&log),
        Duration::from_secs(5),
    )));
    registry.register_topic_listener(Arc::new(RecordingListener::new("fast", Arc::clone(&log))));

    let sink = make_sink(registry);
    sink.handle_topic_deleted(make_topic("t1", "app-1")).await.unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["slow:deleted", "fast:deleted"]);
}

// ── Failure semantics ────────────────────────────────────────────

#[tokio::test]
async fn failure_aborts_remaining_chain() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ListenerRegistry::new();
    registry.register_topic_listener(Arc::new(RecordingListener::new("a", Arc::clone(&log))));
    registry.register_topic_listener(Arc::new(RecordingListener::failing("b", Arc::clone(&log))));
    registry.register_topic_listener(Arc::new(RecordingListener::new("c", Arc::clone(&log))));

    let sink = make_sink(registry);
    let err = sink
        .handle_topic_deleted(make_topic("t1", "app-1"))
        .await
        .unwrap_err();

    match err {
        GovernanceError::Reconciliation { listener, message } => {
            assert_eq!(listener, "topic-deleted#1");
            assert!(message.contains("b refuses deleted"), "message: {message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    // Listener c never ran.
    assert_eq!(*log.lock().unwrap(), vec!["a:deleted", "b:deleted"]);
}

#[tokio::test]
async fn empty_chain_succeeds() {
    let sink = make_sink(ListenerRegistry::new());
    sink.handle_topic_created(make_topic("t1", "app-1"), TopicCreateParams::default())
        .await
        .unwrap();
}

// ── Context capture ──────────────────────────────────────────────

/// Provider whose ambient user can change between sink creations.
struct MutableContextProvider {
    user: Mutex<Option<String>>,
}

impl ContextProvider for MutableContextProvider {
    fn current(&self, environment: &EnvironmentId) -> EventContext {
        let context = EventContext::system(environment.clone());
        match self.user.lock().unwrap().clone() {
            Some(user) => context.with_user(user, false),
            None => context,
        }
    }
}

/// Stores the context of the last observed subscription event.
struct ContextCapturingListener {
    seen: Mutex<Option<EventContext>>,
}

#[async_trait]
impl SubscriptionEventsListener for ContextCapturingListener {
    async fn handle_subscription_created(&self, event: &SubscriptionEvent) -> GovernanceResult<()> {
        *self.seen.lock().unwrap() = Some(event.context.clone());
        Ok(())
    }

    async fn handle_subscription_updated(&self, _event: &SubscriptionEvent) -> GovernanceResult<()> {
        Ok(())
    }

    async fn handle_subscription_deleted(&self, _event: &SubscriptionEvent) -> GovernanceResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn sink_captures_context_at_creation() {
    let provider = Arc::new(MutableContextProvider {
        user: Mutex::new(Some("alice".to_string())),
    });
    let listener = Arc::new(ContextCapturingListener {
        seen: Mutex::new(None),
    });

    let mut registry = ListenerRegistry::new();
    registry.register_subscription_listener(Arc::clone(&listener) as Arc<dyn SubscriptionEventsListener>);
    let bus = EventBus::new(registry, Arc::clone(&provider) as Arc<dyn ContextProvider>);

    let sink = bus.new_sink(EnvironmentId::from("dev"));
    // The ambient user changes after the sink exists; the snapshot must not.
    *provider.user.lock().unwrap() = Some("mallory".to_string());

    sink.handle_subscription_created(make_subscription(
        "s1",
        "app-2",
        "t1",
        SubscriptionState::Pending,
    ))
    .await
    .unwrap();

    let seen = listener.seen.lock().unwrap().clone().unwrap();
    assert_eq!(seen.user_name.as_deref(), Some("alice"));
    assert_eq!(seen.environment, EnvironmentId::from("dev"));
}

// ── Cascading reconciliation ─────────────────────────────────────

/// Approves pending subscriptions when a topic stops requiring approval,
/// cascading a subscription-updated event through its own sink.
struct ApprovalReleaseListener {
    subscriptions: Mutex<Vec<SubscriptionMetadata>>,
    sink: EventSink,
}

#[async_trait]
impl TopicEventsListener for ApprovalReleaseListener {
    async fn handle_topic_created(&self, _event: &TopicCreatedEvent) -> GovernanceResult<()> {
        Ok(())
    }

    async fn handle_topic_deleted(&self, _event: &TopicEvent) -> GovernanceResult<()> {
        Ok(())
    }

    async fn handle_topic_settings_updated(&self, event: &TopicEvent) -> GovernanceResult<()> {
        if event.metadata.subscription_approval_required {
            return Ok(());
        }
        let released: Vec<SubscriptionMetadata> = {
            let mut subscriptions = self.subscriptions.lock().unwrap();
            subscriptions
                .iter_mut()
                .filter(|s| {
                    s.topic_name == event.metadata.name && s.state == SubscriptionState::Pending
                })
                .map(|s| {
                    s.state = SubscriptionState::Approved;
                    s.clone()
                })
                .collect()
        };
        for subscription in released {
            self.sink.handle_subscription_updated(subscription).await?;
        }
        Ok(())
    }

    async fn handle_topic_schema_added(
        &self,
        _event: &TopicSchemaAddedEvent,
    ) -> GovernanceResult<()> {
        Ok(())
    }

    async fn handle_producer_added(&self, _event: &TopicProducerEvent) -> GovernanceResult<()> {
        Ok(())
    }

    async fn handle_producer_removed(&self, _event: &TopicProducerEvent) -> GovernanceResult<()> {
        Ok(())
    }

    async fn handle_topic_owner_changed(
        &self,
        _event: &TopicOwnerChangedEvent,
    ) -> GovernanceResult<()> {
        Ok(())
    }
}

/// Records observed subscription updates as "id:STATE".
struct SubscriptionRecorder {
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl SubscriptionEventsListener for SubscriptionRecorder {
    async fn handle_subscription_created(&self, _event: &SubscriptionEvent) -> GovernanceResult<()> {
        Ok(())
    }

    async fn handle_subscription_updated(&self, event: &SubscriptionEvent) -> GovernanceResult<()> {
        self.log.lock().unwrap().push(format!(
            "{}:{:?}",
            event.metadata.id, event.metadata.state
        ));
        Ok(())
    }

    async fn handle_subscription_deleted(&self, _event: &SubscriptionEvent) -> GovernanceResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn lifting_approval_requirement_releases_pending_subscriptions() {
    let updates = Arc::new(Mutex::new(Vec::new()));

    let mut subscription_registry = ListenerRegistry::new();
    subscription_registry.register_subscription_listener(Arc::new(SubscriptionRecorder {
        log: Arc::clone(&updates),
    }));
    let subscription_sink = make_bus(subscription_registry).new_sink(EnvironmentId::from("dev"));

    let release_listener = Arc::new(ApprovalReleaseListener {
        subscriptions: Mutex::new(vec![
            make_subscription("s1", "app-2", "t1", SubscriptionState::Pending),
            make_subscription("s2", "app-3", "t1", SubscriptionState::Pending),
            make_subscription("s3", "app-4", "other", SubscriptionState::Pending),
            make_subscription("s4", "app-5", "t1", SubscriptionState::Approved),
        ]),
        sink: subscription_sink,
    });

    let mut topic_registry = ListenerRegistry::new();
    topic_registry.register_topic_listener(Arc::clone(&release_listener) as Arc<dyn TopicEventsListener>);
    let topic_sink = make_bus(topic_registry).new_sink(EnvironmentId::from("dev"));

    // The flag flips from required to open.
    let mut topic = make_topic("t1", "app-1");
    topic.subscription_approval_required = false;
    topic_sink.handle_topic_settings_updated(topic).await.unwrap();

    // Only the pending subscriptions of t1 were released, in store order.
    assert_eq!(*updates.lock().unwrap(), vec!["s1:Approved", "s2:Approved"]);
}

// ── Independent capability chains ────────────────────────────────

struct CountingAppListener {
    registered: Mutex<u32>,
}

#[async_trait]
impl steward_events::ApplicationEventsListener for CountingAppListener {
    async fn handle_application_registered(
        &self,
        _event: &ApplicationEvent,
    ) -> GovernanceResult<()> {
        *self.registered.lock().unwrap() += 1;
        Ok(())
    }

    async fn handle_authentication_changed(
        &self,
        _event: &ApplicationEvent,
    ) -> GovernanceResult<()> {
        Ok(())
    }
}

struct RejectingOwnerRequestListener;

#[async_trait]
impl OwnerRequestEventsListener for RejectingOwnerRequestListener {
    async fn handle_owner_request_created(
        &self,
        _event: &OwnerRequestEvent,
    ) -> GovernanceResult<()> {
        Err(GovernanceError::InvalidState("notification down".to_string()))
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

#[tokio::test]
async fn capability_chains_are_independent() {
    let app_listener = Arc::new(CountingAppListener {
        registered: Mutex::new(0),
    });

    let mut registry = ListenerRegistry::new();
    registry.register_application_listener(
        Arc::clone(&app_listener) as Arc<dyn steward_events::ApplicationEventsListener>
    );
    registry.register_owner_request_listener(Arc::new(RejectingOwnerRequestListener));

    let sink = make_sink(registry);

    // A failing owner-request chain leaves the application chain untouched.
    sink.handle_application_registered(steward_types::ApplicationMetadata {
        application_id: ApplicationId::from("app-1"),
        kafka_principal: None,
        internal_topic_prefixes: Vec::new(),
        consumer_group_prefixes: Vec::new(),
        transaction_id_prefixes: Vec::new(),
    })
    .await
    .unwrap();

    assert_eq!(*app_listener.registered.lock().unwrap(), 1);
}
