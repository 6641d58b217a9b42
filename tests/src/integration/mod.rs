//! Cross-crate integration tests.

pub mod concurrency;
pub mod consent_lifecycle;
pub mod runtime;
