//! # Ledger
//!
//! Committed world state shared by all transactions.
//!
//! ## Thread Safety
//!
//! Reads take the read lock for the duration of a single lookup or scan.
//! Commit takes the write lock, so validation and application of one
//! transaction are never interleaved with another commit.

use crate::adapters::InMemoryKVStore;
use crate::domain::{
    chaincode_key, namespace_bounds, range_bounds, state_key, validate_namespace, CommitReceipt,
    IndexDefinition, LedgerError, SecondaryIndex, Version, VersionedValue, SEQUENCE_KEY,
};
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use crate::transaction::{CommitRequest, Transaction};
use parking_lot::RwLock;
use shared_types::QuerySelector;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A decoded committed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommittedEntry {
    pub key: String,
    pub version: Version,
    pub value: Vec<u8>,
}

/// Entries of a scan; decode failures are reported per entry.
pub(crate) type EntryScan = Vec<Result<CommittedEntry, LedgerError>>;

/// What a committed write replaces.
enum Prior {
    Absent,
    Document(Vec<u8>),
    Undecodable,
}

struct LedgerState<B> {
    backend: B,
    sequence: Version,
    indexes: HashMap<String, SecondaryIndex>,
}

/// Versioned, namespaced world state.
pub struct Ledger<B: KeyValueStore> {
    state: RwLock<LedgerState<B>>,
    open_cursors: AtomicUsize,
}

impl Ledger<InMemoryKVStore> {
    /// Empty ledger over an in-memory backend.
    pub fn in_memory() -> Self {
        Self::with_state(InMemoryKVStore::new(), 0)
    }
}

impl<B: KeyValueStore> Ledger<B> {
    /// Open a ledger over an existing backend, resuming its commit sequence.
    pub fn open(backend: B) -> Result<Self, LedgerError> {
        let sequence = match backend.get(SEQUENCE_KEY)? {
            Some(bytes) => {
                let raw: [u8; 8] =
                    bytes
                        .as_slice()
                        .try_into()
                        .map_err(|_| LedgerError::Corrupted {
                            key: "sequence".to_string(),
                            message: format!("expected 8 bytes, found {}", bytes.len()),
                        })?;
                u64::from_be_bytes(raw)
            }
            None => 0,
        };
        info!(sequence, "Opened world state");
        Ok(Self::with_state(backend, sequence))
    }

    fn with_state(backend: B, sequence: Version) -> Self {
        Self {
            state: RwLock::new(LedgerState {
                backend,
                sequence,
                indexes: HashMap::new(),
            }),
            open_cursors: AtomicUsize::new(0),
        }
    }

    /// Install (or replace) the secondary indexes of a namespace and build
    /// them from committed state.
    pub fn define_index(
        &self,
        namespace: &str,
        definitions: Vec<IndexDefinition>,
    ) -> Result<(), LedgerError> {
        validate_namespace(namespace)?;
        let mut state = self.state.write();
        let mut index = SecondaryIndex::new(definitions);

        let (start, end) = namespace_bounds(namespace);
        for entry in state.scan(namespace, &start, &end)? {
            match entry {
                Ok(entry) => index.insert(&entry.key, &entry.value),
                Err(e) => warn!(namespace, error = %e, "Skipping undecodable entry while indexing"),
            }
        }

        info!(
            namespace,
            indexes = index.definitions().len(),
            postings = index.len(),
            "Secondary index built"
        );
        state.indexes.insert(namespace.to_string(), index);
        Ok(())
    }

    /// Start a transaction against `namespace`.
    pub fn begin(&self, namespace: &str) -> Result<Transaction<'_, B>, LedgerError> {
        validate_namespace(namespace)?;
        let tx_id = Uuid::new_v4().to_string();
        debug!(namespace, tx_id = %tx_id, "Transaction started");
        Ok(Transaction::new(self, namespace.to_string(), tx_id))
    }

    /// Run `f` in a fresh transaction and commit only if it succeeds.
    ///
    /// An `Err` from `f` drops the transaction, discarding its writes.
    pub fn execute<'l, T, E, F>(&'l self, namespace: &str, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction<'l, B>) -> Result<T, E>,
        E: From<LedgerError>,
    {
        let mut tx = self.begin(namespace)?;
        let output = f(&mut tx)?;
        tx.commit()?;
        Ok(output)
    }

    /// Last committed sequence number.
    pub fn sequence(&self) -> Version {
        self.state.read().sequence
    }

    /// Iterators handed out and not yet released.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    pub(crate) fn acquire_cursor(&self) {
        self.open_cursors.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn release_cursor(&self) {
        self.open_cursors.fetch_sub(1, Ordering::SeqCst);
    }

    pub(crate) fn read_entry(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<CommittedEntry>, LedgerError> {
        self.state.read().lookup(namespace, key)
    }

    pub(crate) fn scan_entries(
        &self,
        namespace: &str,
        start_key: &str,
        end_key: &str,
    ) -> Result<EntryScan, LedgerError> {
        let (start, end) = range_bounds(namespace, start_key, end_key);
        self.state.read().scan(namespace, &start, &end)
    }

    /// Committed documents matching `selector`, narrowed by the namespace
    /// index when one of the selector fields is indexed.
    pub(crate) fn query_entries(
        &self,
        namespace: &str,
        selector: &QuerySelector,
    ) -> Result<EntryScan, LedgerError> {
        let state = self.state.read();
        let candidates = state
            .indexes
            .get(namespace)
            .and_then(|index| index.candidates(selector));

        let entries = match candidates {
            Some(keys) => {
                debug!(namespace, candidates = keys.len(), "Query answered from index");
                let mut entries = Vec::with_capacity(keys.len());
                for key in keys {
                    match state.lookup(namespace, &key) {
                        Ok(Some(entry)) => entries.push(Ok(entry)),
                        Ok(None) => {}
                        Err(e @ LedgerError::Corrupted { .. }) => entries.push(Err(e)),
                        Err(e) => return Err(e),
                    }
                }
                entries
            }
            None => {
                debug!(namespace, "Query requires namespace scan");
                let (start, end) = namespace_bounds(namespace);
                state.scan(namespace, &start, &end)?
            }
        };

        Ok(entries
            .into_iter()
            .filter(|entry| match entry {
                Ok(entry) => selector.matches_bytes(&entry.value),
                Err(_) => true,
            })
            .collect())
    }

    /// Validate and apply a transaction's buffered writes.
    pub(crate) fn commit(&self, request: CommitRequest) -> Result<CommitReceipt, LedgerError> {
        let CommitRequest {
            tx_id,
            namespace,
            reads,
            ranges,
            writes,
        } = request;

        let mut state = self.state.write();

        for (key, observed) in &reads {
            let current = state.lookup(&namespace, key)?.map(|e| e.version);
            if current != *observed {
                warn!(tx_id = %tx_id, key = %key, "MVCC read conflict");
                return Err(LedgerError::MvccReadConflict {
                    tx_id,
                    key: key.clone(),
                });
            }
        }

        for range in &ranges {
            let (start, end) = range_bounds(&namespace, &range.start_key, &range.end_key);
            let current: Vec<(String, Version)> = state
                .scan(&namespace, &start, &end)?
                .into_iter()
                .filter_map(Result::ok)
                .map(|e| (e.key, e.version))
                .collect();
            if current != range.observed {
                warn!(tx_id = %tx_id, start = %range.start_key, end = %range.end_key, "Phantom read conflict");
                return Err(LedgerError::PhantomReadConflict {
                    tx_id,
                    start_key: range.start_key.clone(),
                    end_key: range.end_key.clone(),
                });
            }
        }

        if writes.is_empty() {
            debug!(tx_id = %tx_id, "Read-only transaction committed");
            return Ok(CommitReceipt {
                tx_id,
                version: None,
                writes: 0,
            });
        }

        let version = state.sequence + 1;
        let mut batch = Vec::with_capacity(writes.len() + 1);
        let mut previous = Vec::with_capacity(writes.len());
        for (key, value) in &writes {
            let raw_key = state_key(&namespace, key);
            let prior = match state.backend.get(&raw_key)? {
                None => Prior::Absent,
                Some(raw) => match VersionedValue::decode(key, &raw) {
                    Ok(stored) => Prior::Document(stored.value),
                    Err(e) => {
                        warn!(tx_id = %tx_id, key = %key, error = %e, "Replacing undecodable entry");
                        Prior::Undecodable
                    }
                },
            };
            previous.push(prior);

            match value {
                Some(value) => {
                    let envelope = VersionedValue::new(version, value.clone()).encode()?;
                    batch.push(BatchOperation::put(raw_key, envelope));
                }
                None => batch.push(BatchOperation::delete(raw_key)),
            }
        }
        batch.push(BatchOperation::put(
            SEQUENCE_KEY.to_vec(),
            version.to_be_bytes().to_vec(),
        ));

        state.backend.atomic_batch_write(batch)?;
        state.sequence = version;

        if let Some(index) = state.indexes.get_mut(&namespace) {
            for ((key, value), prior) in writes.iter().zip(previous) {
                match prior {
                    Prior::Absent => {}
                    Prior::Document(old) => index.remove(key, &old),
                    Prior::Undecodable => index.purge(key),
                }
                if let Some(value) = value {
                    index.insert(key, value);
                }
            }
        }

        info!(
            tx_id = %tx_id,
            namespace = %namespace,
            version,
            writes = writes.len(),
            "Transaction committed"
        );
        Ok(CommitReceipt {
            tx_id,
            version: Some(version),
            writes: writes.len(),
        })
    }
}

impl<B: KeyValueStore> LedgerState<B> {
    fn lookup(&self, namespace: &str, key: &str) -> Result<Option<CommittedEntry>, LedgerError> {
        let Some(raw) = self.backend.get(&state_key(namespace, key))? else {
            return Ok(None);
        };
        let stored = VersionedValue::decode(key, &raw)?;
        Ok(Some(CommittedEntry {
            key: key.to_string(),
            version: stored.version,
            value: stored.value,
        }))
    }

    fn scan(&self, namespace: &str, start: &[u8], end: &[u8]) -> Result<EntryScan, LedgerError> {
        let raw = self.backend.range_scan(start, end)?;
        Ok(raw
            .into_iter()
            .map(|(raw_key, raw_value)| {
                let key = chaincode_key(namespace, &raw_key)?;
                let stored = VersionedValue::decode(&key, &raw_value)?;
                Ok(CommittedEntry {
                    key,
                    version: stored.version,
                    value: stored.value,
                })
            })
            .collect())
    }
}
