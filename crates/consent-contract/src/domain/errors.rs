//! # Error Types
//!
//! Consent operation failures and invocation-level failures.

use shared_types::StoreError;
use thiserror::Error;
use world_state::LedgerError;

// =============================================================================
// CONSENT ERRORS
// =============================================================================

/// Failures of a consent operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsentError {
    /// The operation targets an id with no stored document.
    #[error("the consent {id} does not exist")]
    NotFound { id: String },

    /// Create targets an id that is already stored.
    #[error("the consent {id} already exists")]
    AlreadyExists { id: String },

    /// Document encode/decode failure.
    #[error("invalid consent document {id}: {message}")]
    Serialization { id: String, message: String },

    /// World-state failure, including scan and query failures.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// =============================================================================
// CONTRACT ERRORS
// =============================================================================

/// Failures of a whole invocation, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// No operation with this name.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of positional arguments.
    #[error("{function} expects {expected} arguments, got {found}")]
    Arity {
        function: &'static str,
        expected: usize,
        found: usize,
    },

    /// A boolean argument was neither `true` nor `false`.
    #[error("argument {position} of {function} must be true or false, got {value:?}")]
    InvalidBool {
        function: &'static str,
        position: usize,
        value: String,
    },

    /// The operation itself failed.
    #[error(transparent)]
    Consent(#[from] ConsentError),

    /// The transaction could not be started or committed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ContractError {
    /// True when the request was rejected before touching the world state.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Self::UnknownFunction(_) | Self::Arity { .. } | Self::InvalidBool { .. }
        )
    }

    /// True when resubmitting the same invocation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Ledger(e) if e.is_retryable())
    }
}

impl From<StoreError> for ContractError {
    fn from(err: StoreError) -> Self {
        Self::Consent(ConsentError::Store(err))
    }
}
