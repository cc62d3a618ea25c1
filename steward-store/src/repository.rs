//! Per-(environment, store) materialized views over a record log.

use crate::error::{StoreError, StoreResult};
use crate::record::{LogRecord, RecordOp};
use crate::transport::LogTransport;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use steward_types::{EnvironmentId, Keyed};
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// A key-value store materialized from a replicated append-only log.
///
/// The view has a single writer: the repository's own log-consumption task.
/// Reads are snapshot reads of the current map. `save`/`delete` append one
/// record and resolve once the transport has acknowledged the write and the
/// writer's own view reflects it (write-your-own-reads); consistency with
/// other stores or environments is the caller's problem.
pub struct LogBackedRepository<T> {
    environment: EnvironmentId,
    name: String,
    transport: Arc<dyn LogTransport>,
    view: Arc<RwLock<HashMap<String, T>>>,
    last_applied: Arc<RwLock<Instant>>,
    applied_offset: watch::Receiver<u64>,
    consumer: JoinHandle<()>,
}

impl<T> std::fmt::Debug for LogBackedRepository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogBackedRepository")
            .field("environment", &self.environment)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<T> LogBackedRepository<T>
where
    T: Keyed + Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Opens the store and starts consuming its log from the beginning.
    pub async fn new(
        environment: EnvironmentId,
        name: impl Into<String>,
        transport: Arc<dyn LogTransport>,
    ) -> Self {
        let name = name.into();
        let view = Arc::new(RwLock::new(HashMap::new()));
        let last_applied = Arc::new(RwLock::new(Instant::now()));
        let (applied_tx, applied_rx) = watch::channel(0u64);

        let mut rx = transport.subscribe().await;
        let consumer = {
            let view = Arc::clone(&view);
            let last_applied = Arc::clone(&last_applied);
            let store_name = name.clone();
            tokio::spawn(async move {
                while let Some((offset, record)) = rx.recv().await {
                    match record.op {
                        RecordOp::Upsert(value) => match serde_json::from_value::<T>(value) {
                            Ok(v) => {
                                view.write().await.insert(record.key, v);
                            }
                            Err(e) => {
                                // Still counts as log activity for the idle clock.
                                warn!(
                                    "store '{}': skipping undeserializable record for key '{}': {}",
                                    store_name, record.key, e
                                );
                            }
                        },
                        RecordOp::Tombstone => {
                            view.write().await.remove(&record.key);
                        }
                    }
                    *last_applied.write().await = Instant::now();
                    let _ = applied_tx.send(offset);
                }
                debug!("store '{}': log subscription ended", store_name);
            })
        };

        Self {
            environment,
            name,
            transport,
            view,
            last_applied,
            applied_offset: applied_rx,
            consumer,
        }
    }

    /// Returns the store name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the environment this store belongs to.
    pub fn environment(&self) -> &EnvironmentId {
        &self.environment
    }

    /// Returns true if a non-deleted value is stored under `key`.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.view.read().await.contains_key(key)
    }

    /// Returns the value stored under `key`, if any.
    /// An absent key means deleted or never existed.
    pub async fn get(&self, key: &str) -> Option<T> {
        self.view.read().await.get(key).cloned()
    }

    /// Returns all non-deleted values.
    pub async fn get_all(&self) -> Vec<T> {
        self.view.read().await.values().cloned().collect()
    }

    /// Appends an upsert for the value's key.
    ///
    /// Resolves once the transport acknowledged the append and this
    /// repository's own view has applied it.
    pub async fn save(&self, value: T) -> StoreResult<()> {
        let key = value.key();
        let json = serde_json::to_value(&value)?;
        debug!("store '{}': saving key '{}'", self.name, key);

        let offset = self.transport.append(LogRecord::upsert(key, json)).await?;
        self.await_applied(offset).await
    }

    /// Appends a tombstone for the value's key.
    ///
    /// Tombstoning an absent key is a no-op append; the latest record for
    /// the key is a tombstone either way.
    pub async fn delete(&self, value: &T) -> StoreResult<()> {
        let key = value.key();
        debug!("store '{}': deleting key '{}'", self.name, key);

        let offset = self.transport.append(LogRecord::tombstone(key)).await?;
        self.await_applied(offset).await
    }

    /// Heuristic catch-up barrier.
    ///
    /// Unconditionally waits `initial_wait`, then resolves once no record
    /// has been applied for `idle_timeout`. An append-only log exposes no
    /// authoritative caught-up signal to a generic consumer without offset
    /// bookkeeping, so this is approximate by construction. Resolves on the
    /// tokio scheduler, never inline on the transport delivery path.
    pub async fn wait_for_initialization(&self, initial_wait: Duration, idle_timeout: Duration) {
        tokio::time::sleep(initial_wait).await;

        loop {
            let idle_for = self.last_applied.read().await.elapsed();
            if idle_for >= idle_timeout {
                debug!("store '{}': initialization barrier passed", self.name);
                return;
            }
            tokio::time::sleep(idle_timeout - idle_for).await;
        }
    }

    async fn await_applied(&self, offset: u64) -> StoreResult<()> {
        let mut rx = self.applied_offset.clone();
        while *rx.borrow_and_update() < offset {
            rx.changed()
                .await
                .map_err(|_| StoreError::ConsumerStopped(self.name.clone()))?;
        }
        Ok(())
    }
}

impl<T> Drop for LogBackedRepository<T> {
    fn drop(&mut self) {
        self.consumer.abort();
    }
}
