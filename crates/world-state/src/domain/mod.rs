//! # Domain Layer
//!
//! Ledger entities, key encoding and the derived secondary index.
//! No I/O here.

pub mod entities;
pub mod errors;
pub mod index;
pub mod keys;

pub use entities::*;
pub use errors::*;
pub use index::*;
pub use keys::*;
