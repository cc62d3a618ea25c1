//! Authorization policy derivation for Steward.
//!
//! An identity's required binding set is a pure function of its current
//! ownership, producer and subscription state plus its reserved name
//! prefixes. It is recomputed wholesale after every relevant event and
//! pushed to the messaging cluster; it is never incrementally patched, so
//! idempotent recomputation substitutes for cross-event locking.
//!
//! - [`compute_required_bindings`]: the pure deriver
//! - [`UpdateAclListener`]: the bus listener that rebuilds the affected
//!   identity's context and pushes the recomputed set through [`AclPusher`]

mod binding;
mod deriver;
mod identity;
mod listener;
mod pusher;

pub use binding::{AclBinding, AclOperation, PatternType, Permission, ResourceType};
pub use deriver::{compute_required_bindings, AclConfig, CLUSTER_RESOURCE_NAME};
pub use identity::{AclIdentity, IdentityContext};
pub use listener::UpdateAclListener;
pub use pusher::AclPusher;
