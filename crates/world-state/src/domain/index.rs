//! # Derived Secondary Index
//!
//! Maps `(field, value)` to the keys whose JSON document carries that value.
//! The ledger builds it from committed state in `define_index` and keeps it
//! in step with every commit. It only narrows candidates; callers still apply the
//! full selector to each document.

use crate::domain::entities::IndexDefinition;
use serde_json::Value;
use shared_types::QuerySelector;
use std::collections::{BTreeMap, BTreeSet, HashMap};

type Postings = BTreeMap<String, BTreeSet<String>>;

/// Per-namespace index over scalar top-level document fields.
#[derive(Debug, Default, Clone)]
pub struct SecondaryIndex {
    definitions: Vec<IndexDefinition>,
    postings: HashMap<String, Postings>,
}

impl SecondaryIndex {
    pub fn new(definitions: Vec<IndexDefinition>) -> Self {
        let postings = definitions
            .iter()
            .map(|def| (def.field.clone(), Postings::new()))
            .collect();
        Self {
            definitions,
            postings,
        }
    }

    pub fn definitions(&self) -> &[IndexDefinition] {
        &self.definitions
    }

    /// Index `document` under `key`. Non-JSON values are ignored.
    pub fn insert(&mut self, key: &str, document: &[u8]) {
        for (field, value) in self.indexed_values(document) {
            if let Some(postings) = self.postings.get_mut(&field) {
                postings.entry(value).or_default().insert(key.to_string());
            }
        }
    }

    /// Drop the entries `document` contributed under `key`.
    pub fn remove(&mut self, key: &str, document: &[u8]) {
        for (field, value) in self.indexed_values(document) {
            let Some(postings) = self.postings.get_mut(&field) else {
                continue;
            };
            if let Some(keys) = postings.get_mut(&value) {
                keys.remove(key);
                if keys.is_empty() {
                    postings.remove(&value);
                }
            }
        }
    }

    /// Drop every entry under `key`, whatever document produced it.
    pub fn purge(&mut self, key: &str) {
        for postings in self.postings.values_mut() {
            postings.retain(|_, keys| {
                keys.remove(key);
                !keys.is_empty()
            });
        }
    }

    /// Keys that may satisfy `selector`, or `None` when no selector field
    /// is indexed and the caller must scan.
    pub fn candidates(&self, selector: &QuerySelector) -> Option<BTreeSet<String>> {
        let mut result: Option<BTreeSet<String>> = None;
        for (field, expected) in selector.conditions() {
            let Some(postings) = self.postings.get(field) else {
                continue;
            };
            let keys = postings
                .get(&posting_key(expected))
                .cloned()
                .unwrap_or_default();
            result = Some(match result {
                Some(acc) => acc.intersection(&keys).cloned().collect(),
                None => keys,
            });
        }
        result
    }

    /// Number of indexed `(field, value, key)` triples.
    pub fn len(&self) -> usize {
        self.postings
            .values()
            .flat_map(|postings| postings.values())
            .map(BTreeSet::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn indexed_values(&self, document: &[u8]) -> Vec<(String, String)> {
        let Ok(Value::Object(doc)) = serde_json::from_slice::<Value>(document) else {
            return Vec::new();
        };
        self.definitions
            .iter()
            .filter_map(|def| {
                doc.get(&def.field)
                    .filter(|v| !v.is_object() && !v.is_array())
                    .map(|v| (def.field.clone(), posting_key(v)))
            })
            .collect()
    }
}

/// Canonical JSON text, so `"1"` and `1` index separately.
fn posting_key(value: &Value) -> String {
    value.to_string()
}
