//! # Transaction Handle
//!
//! The `WorldState` implementation chaincode runs against.
//!
//! Reads observe committed state only; a transaction does not see its own
//! buffered writes. Point reads go into the read set, range scans record the
//! keys and versions they returned, and both are re-checked at commit.
//! Rich-query results are not re-checked.

use crate::domain::{CommitReceipt, LedgerError, Version};
use crate::ledger::Ledger;
use crate::ports::outbound::KeyValueStore;
use shared_types::{
    validate_key, KeyValue, QuerySelector, StateIterator, StoreError, WorldState,
};
use std::collections::BTreeMap;
use tracing::debug;

/// A range scanned during the transaction and what it returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RangeRead {
    pub start_key: String,
    pub end_key: String,
    pub observed: Vec<(String, Version)>,
}

/// Everything the ledger needs to validate and apply a transaction.
#[derive(Debug)]
pub(crate) struct CommitRequest {
    pub tx_id: String,
    pub namespace: String,
    pub reads: BTreeMap<String, Option<Version>>,
    pub ranges: Vec<RangeRead>,
    pub writes: BTreeMap<String, Option<Vec<u8>>>,
}

/// One invocation's view of a ledger namespace.
///
/// Dropping it without `commit()` aborts: buffered writes are discarded.
pub struct Transaction<'l, B: KeyValueStore> {
    ledger: &'l Ledger<B>,
    namespace: String,
    tx_id: String,
    reads: BTreeMap<String, Option<Version>>,
    ranges: Vec<RangeRead>,
    /// `None` marks a delete.
    writes: BTreeMap<String, Option<Vec<u8>>>,
    finished: bool,
}

impl<'l, B: KeyValueStore> Transaction<'l, B> {
    pub(crate) fn new(ledger: &'l Ledger<B>, namespace: String, tx_id: String) -> Self {
        Self {
            ledger,
            namespace,
            tx_id,
            reads: BTreeMap::new(),
            ranges: Vec::new(),
            writes: BTreeMap::new(),
            finished: false,
        }
    }

    /// Validate the read set and apply buffered writes atomically.
    pub fn commit(mut self) -> Result<CommitReceipt, LedgerError> {
        self.finished = true;
        let request = CommitRequest {
            tx_id: self.tx_id.clone(),
            namespace: std::mem::take(&mut self.namespace),
            reads: std::mem::take(&mut self.reads),
            ranges: std::mem::take(&mut self.ranges),
            writes: std::mem::take(&mut self.writes),
        };
        self.ledger.commit(request)
    }

    /// Discard buffered writes.
    pub fn abort(self) {
        // Drop does the bookkeeping.
    }

    fn cursor(&self, entries: crate::ledger::EntryScan) -> StateIterator<'l> {
        let ledger = self.ledger;
        ledger.acquire_cursor();
        let items = entries.into_iter().map(|entry| {
            entry
                .map(|e| KeyValue::new(e.key, e.value))
                .map_err(StoreError::from)
        });
        StateIterator::new(items).on_release(move || ledger.release_cursor())
    }
}

impl<B: KeyValueStore> WorldState for Transaction<'_, B> {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        validate_key(key)?;
        let entry = self.ledger.read_entry(&self.namespace, key)?;
        self.reads
            .entry(key.to_string())
            .or_insert(entry.as_ref().map(|e| e.version));
        Ok(entry.map(|e| e.value))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        validate_key(key)?;
        debug!(tx_id = %self.tx_id, key, bytes = value.len(), "put_state");
        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        debug!(tx_id = %self.tx_id, key, "del_state");
        self.writes.insert(key.to_string(), None);
        Ok(())
    }

    fn get_state_by_range(
        &mut self,
        start_key: &str,
        end_key: &str,
    ) -> Result<StateIterator<'_>, StoreError> {
        for bound in [start_key, end_key] {
            if !bound.is_empty() {
                validate_key(bound)?;
            }
        }
        let entries = self
            .ledger
            .scan_entries(&self.namespace, start_key, end_key)?;
        self.ranges.push(RangeRead {
            start_key: start_key.to_string(),
            end_key: end_key.to_string(),
            observed: entries
                .iter()
                .filter_map(|e| e.as_ref().ok())
                .map(|e| (e.key.clone(), e.version))
                .collect(),
        });
        Ok(self.cursor(entries))
    }

    fn get_query_result(
        &mut self,
        selector: &QuerySelector,
    ) -> Result<StateIterator<'_>, StoreError> {
        debug!(tx_id = %self.tx_id, query = %selector, "get_query_result");
        let entries = self.ledger.query_entries(&self.namespace, selector)?;
        Ok(self.cursor(entries))
    }
}

impl<B: KeyValueStore> Drop for Transaction<'_, B> {
    fn drop(&mut self) {
        if !self.finished {
            debug!(
                tx_id = %self.tx_id,
                discarded = self.writes.len(),
                "Transaction aborted"
            );
        }
    }
}

impl<B: KeyValueStore> std::fmt::Debug for Transaction<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("tx_id", &self.tx_id)
            .field("namespace", &self.namespace)
            .field("reads", &self.reads.len())
            .field("writes", &self.writes.len())
            .finish()
    }
}
