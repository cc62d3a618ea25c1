//! Reconciliation event bus for Steward.
//!
//! After a domain service mutates state through a log-backed store, it emits
//! a typed event through a sink obtained from the [`EventBus`]. The sink
//! fans the event out to every registered listener strictly in registration
//! order, each listener starting only once the previous one's completion has
//! resolved. Listeners recompute derived state (most importantly the
//! authorization bindings) and must observe each other's effects, which is
//! why fan-out is sequential rather than concurrent.
//!
//! Events fire only after durable persistence: a failing listener means
//! reconciliation is incomplete, never that the triggering mutation failed.
//!
//! The ambient request context (user, admin flag, originating URI) is
//! captured once when the sink is created and carried on every event, never
//! re-read inside a deferred handler.

mod context;
mod event;
mod listener;
mod sink;

pub use context::{ContextProvider, EventContext, SystemContextProvider};
pub use event::{
    ApplicationEvent, OwnerRequestEvent, SubscriptionEvent, TopicCreatedEvent, TopicEvent,
    TopicOwnerChangedEvent, TopicProducerEvent, TopicSchemaAddedEvent,
};
pub use listener::{
    ApplicationEventsListener, OwnerRequestEventsListener, SubscriptionEventsListener,
    TopicEventsListener,
};
pub use sink::{EventBus, EventSink, ListenerRegistry};
