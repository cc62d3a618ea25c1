//! The wire-level record model of a log-backed store.
//!
//! A store's log holds exactly one JSON-serializable record per append:
//! either an upsert carrying the full value, or a tombstone. Replaying the
//! log in append order and keeping the latest record per key yields the
//! materialized view.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a log record.
/// Uses UUID v7 which embeds a timestamp for natural ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Creates a new record ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The operation a log record carries for its key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data")]
pub enum RecordOp {
    /// Replaces the value stored under the record's key.
    Upsert(serde_json::Value),
    /// Deletes the record's key from the view.
    Tombstone,
}

/// One append to a store's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Unique identifier of this append.
    pub id: RecordId,

    /// The store key this record applies to.
    pub key: String,

    /// Upsert or tombstone.
    #[serde(flatten)]
    pub op: RecordOp,
}

impl LogRecord {
    /// Creates an upsert record.
    #[must_use]
    pub fn upsert(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            id: RecordId::new(),
            key: key.into(),
            op: RecordOp::Upsert(value),
        }
    }

    /// Creates a tombstone record.
    #[must_use]
    pub fn tombstone(key: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            key: key.into(),
            op: RecordOp::Tombstone,
        }
    }

    /// Returns true if this record deletes its key.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        matches!(self.op, RecordOp::Tombstone)
    }
}
