//! Declarative environment staging for Steward.
//!
//! Staging promotes one application's footprint (owned topics, their schema
//! versions, and the application's subscriptions) from a source environment
//! to the next. [`Staging::build`] reads both environments through their
//! [`MetadataReader`](steward_types::MetadataReader)s and computes an
//! ordered change-set; [`Staging::apply`] replays it against the target's
//! domain services, which persist through the same log-backed stores and
//! emit the same reconciliation events as direct mutations.
//!
//! Changes are plain data and structurally comparable: clients can inspect
//! a computed set, carry it across requests, and replay a subset as a
//! filter. Detected precondition violations are kept visible as
//! permanently-failing placeholder changes instead of being silently
//! dropped from the plan.

mod applier;
mod change;
mod staging;

pub use applier::ChangeApplier;
pub use change::{Change, ChangeOutcome, StagingResult};
pub use staging::Staging;
