//! # world-state
//!
//! Host-side world state for chaincode invocations.
//!
//! ## Role in System
//!
//! - **Committed State**: Versioned key/value entries grouped by namespace,
//!   persisted through a `KeyValueStore` backend.
//! - **Transactions**: Each invocation runs against a `Transaction`, the
//!   `WorldState` handle handed to chaincode. Writes are buffered and become
//!   visible together at commit.
//! - **Optimistic Concurrency**: Commit re-validates the read set and range
//!   reads. A transaction that observed state since overwritten is rejected
//!   and nothing is applied.
//! - **Derived Index**: Per-namespace secondary indexes over document fields
//!   answer selector queries without scanning the namespace.
//!
//! ## Commit Flow
//!
//! ```text
//! begin(ns) ──→ Transaction ──get/put/del/scan/query──→ buffered writes
//!                    │                                    read set
//!                    ↓
//!                 commit() ──validate reads──→ atomic batch ──→ index update
//!                    │
//!                    └─ conflict: MvccReadConflict / PhantomReadConflict
//! ```

pub mod adapters;
pub mod domain;
pub mod ledger;
pub mod ports;
pub mod transaction;

pub use adapters::InMemoryKVStore;
pub use domain::*;
pub use ledger::Ledger;
pub use ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
pub use transaction::Transaction;
