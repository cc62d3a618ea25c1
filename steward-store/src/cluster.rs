//! Per-environment cluster collaborator.
//!
//! A `Cluster` owns the stores of one environment. Repositories are
//! constructed once per store name and shared; domain services receive the
//! cluster by injection, never through global lookup.

use crate::error::{StoreError, StoreResult};
use crate::repository::LogBackedRepository;
use crate::transport::LogTransport;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use steward_types::{EnvironmentId, Keyed};
use tokio::sync::RwLock;
use tracing::debug;

/// Produces the log transport backing a named store in an environment.
///
/// Production implementations return broker-backed transports; tests hand
/// out shared `InMemoryLog` instances.
pub trait TransportFactory: Send + Sync {
    /// Returns the transport for `store_name` in `environment`.
    fn transport_for(
        &self,
        environment: &EnvironmentId,
        store_name: &str,
    ) -> Arc<dyn LogTransport>;
}

/// Handle to one environment's log-backed stores.
pub struct Cluster {
    environment: EnvironmentId,
    factory: Arc<dyn TransportFactory>,
    repositories: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl Cluster {
    /// Creates a cluster handle for one environment.
    pub fn new(environment: EnvironmentId, factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            environment,
            factory,
            repositories: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the environment this cluster serves.
    pub fn environment(&self) -> &EnvironmentId {
        &self.environment
    }

    /// Returns the memoized repository for `store_name`, opening it on first
    /// use. Requesting an already-open store with a different value type is
    /// an error.
    pub async fn repository<T>(
        &self,
        store_name: &str,
    ) -> StoreResult<Arc<LogBackedRepository<T>>>
    where
        T: Keyed + Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        if let Some(existing) = self.repositories.read().await.get(store_name) {
            return Arc::clone(existing)
                .downcast::<LogBackedRepository<T>>()
                .map_err(|_| StoreError::WrongValueType(store_name.to_string()));
        }

        let mut repositories = self.repositories.write().await;
        // Re-check: another caller may have opened the store meanwhile.
        if let Some(existing) = repositories.get(store_name) {
            return Arc::clone(existing)
                .downcast::<LogBackedRepository<T>>()
                .map_err(|_| StoreError::WrongValueType(store_name.to_string()));
        }

        debug!(
            "opening store '{}' in environment '{}'",
            store_name, self.environment
        );
        let transport = self.factory.transport_for(&self.environment, store_name);
        let repository = Arc::new(
            LogBackedRepository::<T>::new(self.environment.clone(), store_name, transport).await,
        );
        repositories.insert(store_name.to_string(), repository.clone());
        Ok(repository)
    }
}
