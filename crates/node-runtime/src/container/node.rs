use crate::adapters::StorageBackend;
use crate::container::config::{BackendKind, ConfigError, NodeConfig, StorageConfig};
use consent_contract::ContractHost;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use world_state::{InMemoryKVStore, KVStoreError, Ledger, LedgerError};

/// Startup failures.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] KVStoreError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("seeding failed: {0}")]
    Seed(String),
}

/// Everything a running node needs.
pub struct NodeContainer {
    pub config: NodeConfig,
    host: Arc<ContractHost<StorageBackend>>,
}

impl NodeContainer {
    /// Validate `config`, open the backend and install the consent contract.
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        config.validate()?;

        let backend = open_backend(&config.storage)?;
        info!(backend = backend.name(), "Storage backend ready");

        let ledger = Arc::new(Ledger::open(backend)?);
        let host = Arc::new(ContractHost::new(ledger, config.ledger.namespace.clone())?);
        info!(namespace = %config.ledger.namespace, "Consent contract installed");

        let container = Self { config, host };
        if container.config.ledger.seed_on_start {
            container.seed()?;
        }
        Ok(container)
    }

    pub fn host(&self) -> Arc<ContractHost<StorageBackend>> {
        Arc::clone(&self.host)
    }

    /// Run `InitLedger` in its own transaction.
    pub fn seed(&self) -> Result<(), ContainerError> {
        let response = self.host.init_ledger();
        if !response.is_success() {
            return Err(ContainerError::Seed(response.message));
        }
        info!(sequence = self.host.ledger().sequence(), "Example consents seeded");
        Ok(())
    }
}

fn open_backend(storage: &StorageConfig) -> Result<StorageBackend, ContainerError> {
    match storage.backend {
        BackendKind::Memory => Ok(StorageBackend::Memory(InMemoryKVStore::new())),
        #[cfg(feature = "rocksdb")]
        BackendKind::RocksDb => {
            use crate::adapters::storage::{RocksDbConfig, RocksDbStore};
            let store = RocksDbStore::open(RocksDbConfig {
                path: storage.data_dir.clone(),
                sync_writes: storage.sync_writes,
                ..Default::default()
            })?;
            Ok(StorageBackend::RocksDb(store))
        }
        #[cfg(not(feature = "rocksdb"))]
        BackendKind::RocksDb => Err(ConfigError::BackendUnavailable(BackendKind::RocksDb).into()),
    }
}
