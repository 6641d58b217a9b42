//! # Domain Errors
//!
//! Error types for the host ledger.

use shared_types::StoreError;
use thiserror::Error;

/// Failures of a `KeyValueStore` backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
}

/// Errors raised while opening the ledger or committing a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Backend failure. Nothing from a failed commit was applied.
    #[error("world state backend failure: {0}")]
    Backend(#[from] KVStoreError),

    /// Namespace is empty or contains the separator.
    #[error("invalid namespace {namespace:?}: {reason}")]
    InvalidNamespace {
        namespace: String,
        reason: &'static str,
    },

    /// A key read by the transaction changed before commit.
    #[error("MVCC read conflict in tx {tx_id}: key {key} was modified after it was read")]
    MvccReadConflict { tx_id: String, key: String },

    /// A range scanned by the transaction changed before commit.
    #[error("phantom read conflict in tx {tx_id}: range [{start_key:?}, {end_key:?}) changed")]
    PhantomReadConflict {
        tx_id: String,
        start_key: String,
        end_key: String,
    },

    /// A persisted entry could not be decoded.
    #[error("corrupted ledger entry {key}: {message}")]
    Corrupted { key: String, message: String },

    /// Chaincode-facing store failure surfaced at the ledger boundary.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// True for conflicts the caller may resolve by resubmitting.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::MvccReadConflict { .. } | Self::PhantomReadConflict { .. }
        )
    }
}

impl From<KVStoreError> for StoreError {
    fn from(err: KVStoreError) -> Self {
        StoreError::backend(err.to_string())
    }
}

impl From<LedgerError> for StoreError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Store(inner) => inner,
            LedgerError::Backend(kv) => StoreError::from(kv),
            LedgerError::Corrupted { key, message } => StoreError::Corrupted { key, message },
            other => StoreError::backend(other.to_string()),
        }
    }
}
