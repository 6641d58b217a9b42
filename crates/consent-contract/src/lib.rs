//! # consent-contract
//!
//! Consent records for telecom subscribers, kept in a transactional world
//! state.
//!
//! ## Purpose
//!
//! Creates, reads, updates, deletes and queries consent documents. Every
//! operation takes the host's transaction handle (`&mut dyn WorldState`) as an
//! explicit parameter; the service keeps no state between invocations.
//!
//! ## Components
//!
//! | Component | Location | Role |
//! |-----------|----------|------|
//! | `Consent` | `domain/entities.rs` | The stored document |
//! | `ConsentService` | `service.rs` | Existence checks and store orchestration |
//! | `seed` | `bootstrap.rs` | Writes the three example records |
//! | `ConsentContract` | `contract.rs` | Routes positional invocations to the service |
//! | `ContractHost` | `contract.rs` | Runs one invocation per ledger transaction |
//!
//! ## Error Taxonomy
//!
//! | Error | Raised when |
//! |-------|-------------|
//! | `ConsentError::NotFound` | read/update/delete of a missing id |
//! | `ConsentError::AlreadyExists` | create of an existing id |
//! | `ConsentError::Serialization` | stored bytes are not a consent document |
//! | `ConsentError::Store` | the world state failed |
//!
//! Any error aborts the invocation; none of its writes become visible.

pub mod bootstrap;
pub mod contract;
pub mod domain;
pub mod ports;
pub mod service;

pub use bootstrap::{consent_indexes, seed, seed_consents};
pub use contract::{ConsentContract, ContractHost, HostStats, Invocation, InvocationResponse};
pub use domain::*;
pub use ports::inbound::ConsentApi;
pub use service::ConsentService;
