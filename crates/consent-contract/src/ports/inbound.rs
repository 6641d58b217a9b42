//! # Driving Ports (API - Inbound)
//!
//! Operations exposed to the invocation dispatcher. Each call receives the
//! transaction handle of the invocation it belongs to.

use crate::domain::entities::Consent;
use crate::domain::errors::ConsentError;
use shared_types::WorldState;

/// Consent lifecycle API.
///
/// List results have no guaranteed order.
pub trait ConsentApi: Send + Sync {
    /// True iff a document is stored under `id`.
    fn consent_exists(&self, ctx: &mut dyn WorldState, id: &str) -> Result<bool, ConsentError>;

    /// Store a new consent. Fails with `AlreadyExists` if the id is taken.
    fn create_consent(&self, ctx: &mut dyn WorldState, consent: Consent)
        -> Result<(), ConsentError>;

    /// Fetch a consent. Fails with `NotFound` if absent.
    fn read_consent(&self, ctx: &mut dyn WorldState, id: &str) -> Result<Consent, ConsentError>;

    /// Replace a stored consent wholesale. Fails with `NotFound` if absent.
    fn update_consent(&self, ctx: &mut dyn WorldState, consent: Consent)
        -> Result<(), ConsentError>;

    /// Remove a consent. Fails with `NotFound` if absent.
    fn delete_consent(&self, ctx: &mut dyn WorldState, id: &str) -> Result<(), ConsentError>;

    /// Every consent in the namespace.
    fn all_consents(&self, ctx: &mut dyn WorldState) -> Result<Vec<Consent>, ConsentError>;

    /// Consents whose `provider` equals `provider`.
    fn consents_by_provider(
        &self,
        ctx: &mut dyn WorldState,
        provider: &str,
    ) -> Result<Vec<Consent>, ConsentError>;

    /// Consents whose `userId` equals `user_id`.
    fn consents_by_user(
        &self,
        ctx: &mut dyn WorldState,
        user_id: &str,
    ) -> Result<Vec<Consent>, ConsentError>;
}
