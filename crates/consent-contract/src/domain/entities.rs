//! # Consent Document
//!
//! The persisted form is the JSON object
//!
//! ```text
//! {"id", "userId", "service", "provider", "consentGiven",
//!  "timestamp", "expirationDate", "purpose"}
//! ```
//!
//! Decoding is strict: every field must be present with the right type and
//! unknown fields are rejected.

use crate::domain::errors::ConsentError;
use serde::{Deserialize, Serialize};

/// Providers the network was set up for. Informational only; other values
/// are stored as given.
pub const KNOWN_PROVIDERS: [&str; 2] = ["JIO", "Airtel"];

/// Document field holding the provider.
pub const PROVIDER_FIELD: &str = "provider";

/// Document field holding the subscriber id.
pub const USER_FIELD: &str = "userId";

/// A subscriber's consent to a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Consent {
    /// Ledger key. Immutable once created.
    pub id: String,
    pub user_id: String,
    pub service: String,
    pub provider: String,
    pub consent_given: bool,
    /// Not validated.
    pub timestamp: String,
    /// Not validated.
    pub expiration_date: String,
    pub purpose: String,
}

impl Consent {
    /// True when `provider` is one of [`KNOWN_PROVIDERS`].
    pub fn has_known_provider(&self) -> bool {
        KNOWN_PROVIDERS.contains(&self.provider.as_str())
    }

    /// Canonical JSON encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ConsentError> {
        serde_json::to_vec(self).map_err(|e| ConsentError::Serialization {
            id: self.id.clone(),
            message: e.to_string(),
        })
    }

    /// Decode the document stored under `key`.
    pub fn from_bytes(key: &str, bytes: &[u8]) -> Result<Self, ConsentError> {
        serde_json::from_slice(bytes).map_err(|e| ConsentError::Serialization {
            id: key.to_string(),
            message: e.to_string(),
        })
    }
}
