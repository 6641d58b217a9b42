//! # Shared Types Crate
//!
//! The world-state port shared by the host ledger (`world-state`) and the
//! chaincode (`consent-contract`).
//!
//! ## Design Principles
//!
//! - **Explicit Transaction Handle**: Every store call goes through a
//!   `WorldState` implementor supplied per invocation. There is no ambient
//!   ledger access.
//! - **Scoped Cursors**: Range and query results are `StateIterator`s that
//!   release their cursor on close, exhaustion or drop.
//! - **Declarative Queries**: Rich queries are expressed as a
//!   `QuerySelector`, never as hand-formatted query strings.

pub mod errors;
pub mod query;
pub mod state;

pub use errors::*;
pub use query::QuerySelector;
pub use state::*;
