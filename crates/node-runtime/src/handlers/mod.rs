//! # Handlers
//!
//! Request handling for the node's invocation endpoint.

pub mod invocation;

pub use invocation::{handle_line, serve, serve_until, ServeError, ServeSummary};
