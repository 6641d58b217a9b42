//! # Domain Entities
//!
//! ## Versioning
//!
//! Every commit that writes anything gets the next sequence number. Each
//! entry it writes is stamped with that number, which is what MVCC
//! validation compares.

use crate::domain::errors::LedgerError;
use serde::{Deserialize, Serialize};

/// Commit sequence number stamped on written entries.
pub type Version = u64;

/// Persisted form of a world-state value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedValue {
    pub version: Version,
    pub value: Vec<u8>,
}

impl VersionedValue {
    pub fn new(version: Version, value: Vec<u8>) -> Self {
        Self { version, value }
    }

    /// Bincode envelope stored in the backend.
    pub fn encode(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Corrupted {
            key: String::new(),
            message: e.to_string(),
        })
    }

    pub fn decode(key: &str, bytes: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(bytes).map_err(|e| LedgerError::Corrupted {
            key: key.to_string(),
            message: e.to_string(),
        })
    }
}

/// A single-field secondary index over JSON documents in a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexDefinition {
    pub name: String,
    /// Top-level document field.
    pub field: String,
}

impl IndexDefinition {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
        }
    }
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub tx_id: String,
    /// Sequence the writes were stamped with. `None` for read-only commits.
    pub version: Option<Version>,
    pub writes: usize,
}

impl CommitReceipt {
    pub fn is_read_only(&self) -> bool {
        self.version.is_none()
    }
}
