//! Log-backed key-value stores for Steward.
//!
//! Metadata is not kept in a conventional database: each store materializes
//! an in-memory key-value view by replaying a replicated append-only log.
//! The log is the durable source of truth; the latest record per key wins.
//!
//! # Architecture
//!
//! - **`LogRecord`**: one upsert or tombstone per key per append
//! - **`LogTransport`**: the replicated-log seam; `InMemoryLog` is the
//!   in-process implementation used by tests (a broker-backed transport is
//!   implemented outside the core)
//! - **`LogBackedRepository`**: per (environment, store) materialized view
//!   with write-your-own-reads completions and an idle-heuristic
//!   initialization barrier
//! - **`Cluster`**: per-environment collaborator handing out memoized
//!   repository handles
//!
//! Cross-store consistency across environments is not guaranteed and is the
//! caller's problem.

mod cluster;
mod error;
mod record;
mod repository;
mod transport;

pub use cluster::{Cluster, TransportFactory};
pub use error::{StoreError, StoreResult};
pub use record::{LogRecord, RecordId, RecordOp};
pub use repository::LogBackedRepository;
pub use transport::{InMemoryLog, LogTransport};
