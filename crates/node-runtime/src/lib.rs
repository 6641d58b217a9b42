//! # Node Runtime Library
//!
//! This library exposes the internal modules of the node runtime for testing.
//! The main entry point is the `main.rs` binary.
//!
//! ## Modules
//!
//! - `container/` - Configuration and startup wiring
//! - `adapters/` - World-state storage backends
//! - `handlers/` - JSON-lines invocation endpoint

pub mod adapters;
pub mod container;
pub mod handlers;

pub use container::{ContainerError, NodeConfig, NodeContainer};
pub use handlers::{serve, serve_until, ServeSummary};
