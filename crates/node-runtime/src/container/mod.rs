//! # Node Container
//!
//! Owns the configured backend, the ledger over it and the contract host.

pub mod config;
pub mod node;

pub use config::{BackendKind, ConfigError, LedgerConfig, LoggingConfig, NodeConfig, StorageConfig};
pub use node::{ContainerError, NodeContainer};
