//! # Node Configuration
//!
//! Runtime parameters with sane defaults, overridable from the environment.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `CONSENT_BACKEND` | `storage.backend` | `memory` |
//! | `CONSENT_DATA_DIR` | `storage.data_dir` | `./data/state` |
//! | `CONSENT_NAMESPACE` | `ledger.namespace` | `consent` |
//! | `CONSENT_SEED_ON_START` | `ledger.seed_on_start` | `false` |
//! | `CONSENT_LOG_LEVEL` | `logging.level` | `info` |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const ENV_BACKEND: &str = "CONSENT_BACKEND";
pub const ENV_DATA_DIR: &str = "CONSENT_DATA_DIR";
pub const ENV_NAMESPACE: &str = "CONSENT_NAMESPACE";
pub const ENV_SEED_ON_START: &str = "CONSENT_SEED_ON_START";
pub const ENV_LOG_LEVEL: &str = "CONSENT_LOG_LEVEL";

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Ledger configuration.
    pub ledger: LedgerConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl NodeConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_BACKEND) {
            config.storage.backend = value.parse()?;
        }
        if let Some(value) = lookup(ENV_DATA_DIR) {
            config.storage.data_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_NAMESPACE) {
            config.ledger.namespace = value;
        }
        if let Some(value) = lookup(ENV_SEED_ON_START) {
            config.ledger.seed_on_start = parse_flag(ENV_SEED_ON_START, &value)?;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            config.logging.level = value;
        }

        Ok(config)
    }

    /// Reject configurations the node cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger.namespace.trim().is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        if self.ledger.namespace.contains('\u{0}') {
            return Err(ConfigError::InvalidValue {
                variable: ENV_NAMESPACE,
                value: self.ledger.namespace.clone(),
            });
        }
        if self.storage.backend == BackendKind::RocksDb && !cfg!(feature = "rocksdb") {
            return Err(ConfigError::BackendUnavailable(BackendKind::RocksDb));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable could not be parsed.
    #[error("invalid value {value:?} for {variable}")]
    InvalidValue {
        variable: &'static str,
        value: String,
    },

    /// The chaincode namespace is empty.
    #[error("ledger namespace must not be empty (set CONSENT_NAMESPACE)")]
    EmptyNamespace,

    /// The backend was not compiled in.
    #[error("storage backend {0} is not available; rebuild with --features {0}")]
    BackendUnavailable(BackendKind),
}

/// World-state backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// Volatile, lost on exit.
    #[default]
    Memory,
    /// Persistent, under `StorageConfig::data_dir`.
    RocksDb,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::RocksDb => f.write_str("rocksdb"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "rocksdb" => Ok(Self::RocksDb),
            _ => Err(ConfigError::InvalidValue {
                variable: ENV_BACKEND,
                value: s.to_string(),
            }),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Backend holding the world state.
    pub backend: BackendKind,
    /// RocksDB directory.
    pub data_dir: PathBuf,
    /// fsync every commit (RocksDB only).
    pub sync_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            data_dir: PathBuf::from("./data/state"),
            sync_writes: true,
        }
    }
}

/// Ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Namespace the consent contract owns.
    pub namespace: String,
    /// Run `InitLedger` before serving.
    pub seed_on_start: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            namespace: "consent".to_string(),
            seed_on_start: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn parse_flag(variable: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            variable,
            value: value.to_string(),
        }),
    }
}
