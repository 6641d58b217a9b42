//! # Storage Adapters
//!
//! World-state backends selectable at startup.
//!
//! ## Usage
//!
//! Enable the `rocksdb` feature for the persistent backend:
//!
//! ```toml
//! node-runtime = { path = "...", features = ["rocksdb"] }
//! ```

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore};

pub use world_state::InMemoryKVStore;

use world_state::{BatchOperation, KVStoreError, KeyValueStore, ScanResult};

/// The backend chosen by configuration.
pub enum StorageBackend {
    Memory(InMemoryKVStore),
    #[cfg(feature = "rocksdb")]
    RocksDb(RocksDbStore),
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            #[cfg(feature = "rocksdb")]
            Self::RocksDb(_) => "rocksdb",
        }
    }
}

impl KeyValueStore for StorageBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        match self {
            Self::Memory(store) => store.get(key),
            #[cfg(feature = "rocksdb")]
            Self::RocksDb(store) => store.get(key),
        }
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        match self {
            Self::Memory(store) => store.atomic_batch_write(operations),
            #[cfg(feature = "rocksdb")]
            Self::RocksDb(store) => store.atomic_batch_write(operations),
        }
    }

    fn range_scan(&self, start: &[u8], end: &[u8]) -> Result<ScanResult, KVStoreError> {
        match self {
            Self::Memory(store) => store.range_scan(start, end),
            #[cfg(feature = "rocksdb")]
            Self::RocksDb(store) => store.range_scan(start, end),
        }
    }
}

impl std::fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StorageBackend").field(&self.name()).finish()
    }
}
