//! The cluster-side ACL surface.

use crate::identity::AclIdentity;
use async_trait::async_trait;
use steward_types::GovernanceResult;

/// Pushes derived binding sets to one environment's messaging cluster.
///
/// Implemented outside the core against the cluster's admin API. The
/// implementation is expected to diff the pushed set against what the
/// cluster currently holds and converge it; the core always pushes the
/// complete set.
#[async_trait]
pub trait AclPusher: Send + Sync {
    /// Converges the cluster's ACLs for the identity's principal to exactly
    /// the identity's binding set.
    async fn update_user_acls(&self, identity: &AclIdentity) -> GovernanceResult<()>;

    /// Removes every ACL of the identity's principal (credential revoked or
    /// rotated away).
    async fn remove_user_acls(&self, identity: &AclIdentity) -> GovernanceResult<()>;
}
