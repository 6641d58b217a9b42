//! # Adapters
//!
//! Implementations of the world-state storage port.

pub mod storage;

pub use storage::StorageBackend;
