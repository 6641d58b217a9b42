//! # Error Types
//!
//! Failures surfaced through the world-state port.

use thiserror::Error;

/// Errors raised by a `WorldState` implementation.
///
/// Any of these aborts the enclosing invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The underlying persistence layer failed.
    #[error("failed to read from world state: {message}")]
    Backend { message: String },

    /// A stored entry could not be decoded by the host.
    #[error("corrupted world state entry for key {key}: {message}")]
    Corrupted { key: String, message: String },

    /// Key is empty or uses the reserved namespace separator.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// Selector is malformed or uses an unsupported operator.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl StoreError {
    /// Wrap a backend failure.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
