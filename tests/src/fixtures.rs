//! Shared builders for tests and benchmarks.

use consent_contract::{Consent, ContractHost, Invocation};
use std::sync::Arc;
use world_state::{InMemoryKVStore, Ledger, LedgerError};

pub const NAMESPACE: &str = "consent";

/// A host over a fresh in-memory ledger.
pub fn memory_host() -> Result<ContractHost<InMemoryKVStore>, LedgerError> {
    ContractHost::new(Arc::new(Ledger::in_memory()), NAMESPACE)
}

pub fn consent(id: &str, user_id: &str, provider: &str) -> Consent {
    Consent {
        id: id.to_string(),
        user_id: user_id.to_string(),
        service: "svc".to_string(),
        provider: provider.to_string(),
        consent_given: true,
        timestamp: "2023-05-01".to_string(),
        expiration_date: "2024-05-01".to_string(),
        purpose: "analytics".to_string(),
    }
}

/// Positional arguments for `CreateConsent` / `UpdateConsent`.
pub fn consent_args(consent: &Consent) -> Vec<String> {
    vec![
        consent.id.clone(),
        consent.user_id.clone(),
        consent.service.clone(),
        consent.provider.clone(),
        consent.consent_given.to_string(),
        consent.timestamp.clone(),
        consent.expiration_date.clone(),
        consent.purpose.clone(),
    ]
}

pub fn create(consent: &Consent) -> Invocation {
    Invocation::new("CreateConsent", consent_args(consent))
}

pub fn update(consent: &Consent) -> Invocation {
    Invocation::new("UpdateConsent", consent_args(consent))
}

pub fn call(function: &str, args: &[&str]) -> Invocation {
    Invocation::new(function, args.iter().copied())
}
