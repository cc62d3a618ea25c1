//! The replicated-log transport seam.
//!
//! Implementing the log itself is outside the core: production deployments
//! plug in a broker-backed transport, tests use `InMemoryLog`. Either way a
//! transport only appends records and streams them back in append order; it
//! exposes no authoritative "fully caught up" signal, which is why the
//! repository's initialization barrier is idle-based.

use crate::error::{StoreError, StoreResult};
use crate::record::LogRecord;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

/// An append-only, replayable record log.
///
/// Offsets are 1-based positions in append order. Completions may resolve on
/// any worker thread; consumers must not assume thread affinity.
#[async_trait]
pub trait LogTransport: Send + Sync {
    /// Appends one record, resolving with its offset once the transport has
    /// acknowledged the write. Fails only if the write fails; no retries.
    async fn append(&self, record: LogRecord) -> StoreResult<u64>;

    /// Opens a subscription that first replays every record already in the
    /// log, then tails live appends, each paired with its offset.
    async fn subscribe(&self) -> mpsc::UnboundedReceiver<(u64, LogRecord)>;
}

#[derive(Default)]
struct LogInner {
    records: Vec<LogRecord>,
    subscribers: Vec<mpsc::UnboundedSender<(u64, LogRecord)>>,
}

/// In-process log transport.
///
/// Replay and live delivery happen under one lock, so every subscriber sees
/// records in append order without gaps or duplicates.
#[derive(Default)]
pub struct InMemoryLog {
    inner: Mutex<LogInner>,
    fail_appends: AtomicBool,
}

impl InMemoryLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent appends fail, for exercising transport-failure paths.
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of records in the log.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    /// Returns true if the log holds no records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl LogTransport for InMemoryLog {
    async fn append(&self, record: LogRecord) -> StoreResult<u64> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("append failed (injected)".into()));
        }

        let mut inner = self.inner.lock().await;
        inner.records.push(record.clone());
        let offset = inner.records.len() as u64;

        inner
            .subscribers
            .retain(|tx| tx.send((offset, record.clone())).is_ok());

        Ok(offset)
    }

    async fn subscribe(&self) -> mpsc::UnboundedReceiver<(u64, LogRecord)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().await;

        debug!("replaying {} records to new subscriber", inner.records.len());
        for (i, record) in inner.records.iter().enumerate() {
            // A receiver dropped mid-replay just ends up with a closed channel.
            let _ = tx.send((i as u64 + 1, record.clone()));
        }

        inner.subscribers.push(tx);
        rx
    }
}
