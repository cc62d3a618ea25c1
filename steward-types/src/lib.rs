//! Core type definitions for Steward.
//!
//! This crate defines the fundamental, transport-agnostic types used
//! throughout the governance engine:
//! - Environment and application identifiers
//! - Domain metadata records (topics, subscriptions, schemas, applications,
//!   owner requests)
//! - The shared error taxonomy
//! - The read-accessor surface (`MetadataReader`) consumed by the staging
//!   engine and the ACL reconciliation path
//!
//! REST DTOs, credential issuance and all UI support types live outside the
//! core and do not belong here.

mod error;
mod ids;
mod model;
mod reader;

pub use error::{GovernanceError, GovernanceResult};
pub use ids::{ApplicationId, EnvironmentId};
pub use model::{
    ApplicationMetadata, ApplicationOwnerRequest, Keyed, RequestState, SchemaMetadata,
    SubscriptionMetadata, SubscriptionState, TopicCreateParams, TopicMetadata, TopicType,
};
pub use reader::MetadataReader;
