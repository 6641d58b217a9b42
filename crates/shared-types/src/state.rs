//! # World State Port
//!
//! The transaction handle a host passes into every chaincode call.
//!
//! Point reads treat a missing key as `Ok(None)`. Writes and deletes are
//! unconditional; existence rules belong to the caller.

use crate::errors::StoreError;
use crate::query::QuerySelector;

/// Separator between namespace and key in host storage. Not allowed in keys.
pub const NAMESPACE_SEPARATOR: char = '\u{0}';

/// One entry produced by a range scan or a rich query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Transaction-scoped access to a namespace of the world state.
///
/// Implemented by the host's transaction handle. Chaincode receives it as an
/// explicit `&mut` parameter for the duration of one invocation.
pub trait WorldState {
    /// Identifier of the enclosing transaction.
    fn tx_id(&self) -> &str;

    /// Read a value. Absence is not an error.
    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write a value, overwriting whatever is there.
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Remove a key. Removing an absent key succeeds.
    fn del_state(&mut self, key: &str) -> Result<(), StoreError>;

    /// Scan keys in `[start_key, end_key)` in key order.
    ///
    /// An empty bound is open, so `("", "")` yields the whole namespace.
    fn get_state_by_range(
        &mut self,
        start_key: &str,
        end_key: &str,
    ) -> Result<StateIterator<'_>, StoreError>;

    /// Evaluate a selector over document-shaped values.
    ///
    /// Result order is unspecified.
    fn get_query_result(
        &mut self,
        selector: &QuerySelector,
    ) -> Result<StateIterator<'_>, StoreError>;
}

/// Validate a chaincode key before it reaches host storage.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey {
            key: key.to_string(),
            reason: "key must not be empty",
        });
    }
    if key.contains(NAMESPACE_SEPARATOR) {
        return Err(StoreError::InvalidKey {
            key: key.to_string(),
            reason: "key must not contain U+0000",
        });
    }
    Ok(())
}

type ReleaseFn<'a> = Box<dyn FnOnce() + 'a>;

/// Forward-only cursor over world-state entries.
///
/// The cursor is released exactly once: by `close()`, by running to the end,
/// or by being dropped. An early `?` return in the consumer therefore still
/// frees host resources.
pub struct StateIterator<'a> {
    inner: Box<dyn Iterator<Item = Result<KeyValue, StoreError>> + 'a>,
    release: Option<ReleaseFn<'a>>,
    closed: bool,
}

impl<'a> StateIterator<'a> {
    /// Wrap a sequence of results.
    pub fn new<I>(inner: I) -> Self
    where
        I: Iterator<Item = Result<KeyValue, StoreError>> + 'a,
    {
        Self {
            inner: Box::new(inner),
            release: None,
            closed: false,
        }
    }

    /// An iterator that yields nothing.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Register the hook that frees the host cursor.
    pub fn on_release<F>(mut self, release: F) -> Self
    where
        F: FnOnce() + 'a,
    {
        self.release = Some(Box::new(release));
        self
    }

    /// Release the cursor without consuming the rest.
    pub fn close(mut self) {
        self.release_cursor();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn release_cursor(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Iterator for StateIterator<'_> {
    type Item = Result<KeyValue, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        let item = self.inner.next();
        if item.is_none() {
            self.release_cursor();
        }
        item
    }
}

impl Drop for StateIterator<'_> {
    fn drop(&mut self) {
        self.release_cursor();
    }
}

impl std::fmt::Debug for StateIterator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateIterator")
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
