//! # Backend Key Layout
//!
//! ```text
//! <namespace> 0x00 <key>      world-state entry
//! 0x00 "sequence"             last committed sequence (u64 big-endian)
//! ```
//!
//! Namespaces are non-empty, so the metadata key never collides with an
//! entry. All keys of a namespace sort inside `[ns 0x00, ns 0x01)`.

use crate::domain::errors::LedgerError;
use shared_types::NAMESPACE_SEPARATOR;

const SEPARATOR: u8 = 0x00;
const SEPARATOR_UPPER: u8 = 0x01;

/// Backend key holding the last committed sequence.
pub const SEQUENCE_KEY: &[u8] = b"\x00sequence";

pub fn validate_namespace(namespace: &str) -> Result<(), LedgerError> {
    if namespace.is_empty() {
        return Err(LedgerError::InvalidNamespace {
            namespace: namespace.to_string(),
            reason: "namespace must not be empty",
        });
    }
    if namespace.contains(NAMESPACE_SEPARATOR) {
        return Err(LedgerError::InvalidNamespace {
            namespace: namespace.to_string(),
            reason: "namespace must not contain U+0000",
        });
    }
    Ok(())
}

/// Backend key for `key` in `namespace`.
pub fn state_key(namespace: &str, key: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(namespace.len() + 1 + key.len());
    out.extend_from_slice(namespace.as_bytes());
    out.push(SEPARATOR);
    out.extend_from_slice(key.as_bytes());
    out
}

/// Backend bounds for chaincode range `[start_key, end_key)`.
///
/// Empty bounds are open within the namespace.
pub fn range_bounds(namespace: &str, start_key: &str, end_key: &str) -> (Vec<u8>, Vec<u8>) {
    let start = state_key(namespace, start_key);
    let end = if end_key.is_empty() {
        namespace_upper_bound(namespace)
    } else {
        state_key(namespace, end_key)
    };
    (start, end)
}

/// Bounds covering the whole namespace.
pub fn namespace_bounds(namespace: &str) -> (Vec<u8>, Vec<u8>) {
    (state_key(namespace, ""), namespace_upper_bound(namespace))
}

fn namespace_upper_bound(namespace: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(namespace.len() + 1);
    out.extend_from_slice(namespace.as_bytes());
    out.push(SEPARATOR_UPPER);
    out
}

/// Strip the namespace prefix from a backend key.
pub fn chaincode_key(namespace: &str, raw: &[u8]) -> Result<String, LedgerError> {
    let prefix_len = namespace.len() + 1;
    let valid_prefix = raw.len() >= prefix_len
        && raw.starts_with(namespace.as_bytes())
        && raw[namespace.len()] == SEPARATOR;
    if !valid_prefix {
        return Err(LedgerError::Corrupted {
            key: String::from_utf8_lossy(raw).into_owned(),
            message: format!("key outside namespace {namespace}"),
        });
    }
    String::from_utf8(raw[prefix_len..].to_vec()).map_err(|e| LedgerError::Corrupted {
        key: String::from_utf8_lossy(raw).into_owned(),
        message: e.to_string(),
    })
}
