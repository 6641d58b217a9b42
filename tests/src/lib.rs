//! # Consent Ledger Test Suite
//!
//! Unified test crate for flows that span several crates.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── consent_lifecycle.rs   # Contract operations against a real ledger
//!     ├── concurrency.rs         # MVCC conflicts between invocations
//!     └── runtime.rs             # Node container and JSON-lines endpoint
//!
//! tests/benches/
//! └── consent_benchmarks.rs      # Indexed vs scanned queries, commit cost
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p consent-tests
//! cargo test -p consent-tests integration::concurrency
//! cargo bench -p consent-tests
//! ```

pub mod fixtures;
pub mod integration;
