//! # Adapters Layer
//!
//! Backends implementing the `KeyValueStore` port.

pub mod memory;

pub use memory::*;
