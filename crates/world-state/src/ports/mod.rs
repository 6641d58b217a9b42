//! # Ports Layer
//!
//! - **Driven Ports (Outbound)**: `KeyValueStore`
//! - The driving port is `shared_types::WorldState`, implemented by `Transaction`.

pub mod outbound;

pub use outbound::*;
