//! # Driven Ports (SPI - Outbound)
//!
//! The contract's only dependency is the host-supplied world state. The
//! trait lives in `shared-types` so hosts can implement it without pulling in
//! the contract.

pub use shared_types::{KeyValue, QuerySelector, StateIterator, StoreError, WorldState};
