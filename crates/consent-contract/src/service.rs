//! # Consent Service
//!
//! Existence checks, document encoding and store orchestration for every
//! consent operation. Nothing is cached between calls; each operation
//! re-reads the world state through the handle it is given.

use crate::domain::entities::{Consent, PROVIDER_FIELD, USER_FIELD};
use crate::domain::errors::ConsentError;
use crate::ports::inbound::ConsentApi;
use shared_types::{QuerySelector, StateIterator, WorldState};
use tracing::{debug, info, instrument};

/// Stateless implementation of [`ConsentApi`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsentService;

impl ConsentService {
    pub fn new() -> Self {
        Self
    }

    fn query(
        &self,
        ctx: &mut dyn WorldState,
        selector: QuerySelector,
    ) -> Result<Vec<Consent>, ConsentError> {
        debug!(query = %selector, "Running rich query");
        collect_consents(ctx.get_query_result(&selector)?)
    }
}

impl ConsentApi for ConsentService {
    #[instrument(skip(self, ctx), fields(tx_id = %ctx.tx_id()))]
    fn consent_exists(&self, ctx: &mut dyn WorldState, id: &str) -> Result<bool, ConsentError> {
        Ok(ctx.get_state(id)?.is_some())
    }

    #[instrument(skip(self, ctx, consent), fields(tx_id = %ctx.tx_id(), id = %consent.id))]
    fn create_consent(
        &self,
        ctx: &mut dyn WorldState,
        consent: Consent,
    ) -> Result<(), ConsentError> {
        if self.consent_exists(ctx, &consent.id)? {
            return Err(ConsentError::AlreadyExists { id: consent.id });
        }
        let bytes = consent.to_bytes()?;
        ctx.put_state(&consent.id, bytes)?;
        info!(provider = %consent.provider, "Consent created");
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(tx_id = %ctx.tx_id()))]
    fn read_consent(&self, ctx: &mut dyn WorldState, id: &str) -> Result<Consent, ConsentError> {
        match ctx.get_state(id)? {
            Some(bytes) => Consent::from_bytes(id, &bytes),
            None => Err(ConsentError::NotFound { id: id.to_string() }),
        }
    }

    #[instrument(skip(self, ctx, consent), fields(tx_id = %ctx.tx_id(), id = %consent.id))]
    fn update_consent(
        &self,
        ctx: &mut dyn WorldState,
        consent: Consent,
    ) -> Result<(), ConsentError> {
        if !self.consent_exists(ctx, &consent.id)? {
            return Err(ConsentError::NotFound { id: consent.id });
        }
        // Full replace: nothing from the previous document survives.
        let bytes = consent.to_bytes()?;
        ctx.put_state(&consent.id, bytes)?;
        info!("Consent updated");
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(tx_id = %ctx.tx_id()))]
    fn delete_consent(&self, ctx: &mut dyn WorldState, id: &str) -> Result<(), ConsentError> {
        if !self.consent_exists(ctx, id)? {
            return Err(ConsentError::NotFound { id: id.to_string() });
        }
        ctx.del_state(id)?;
        info!("Consent deleted");
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(tx_id = %ctx.tx_id()))]
    fn all_consents(&self, ctx: &mut dyn WorldState) -> Result<Vec<Consent>, ConsentError> {
        collect_consents(ctx.get_state_by_range("", "")?)
    }

    #[instrument(skip(self, ctx), fields(tx_id = %ctx.tx_id()))]
    fn consents_by_provider(
        &self,
        ctx: &mut dyn WorldState,
        provider: &str,
    ) -> Result<Vec<Consent>, ConsentError> {
        self.query(ctx, QuerySelector::field_eq(PROVIDER_FIELD, provider))
    }

    #[instrument(skip(self, ctx), fields(tx_id = %ctx.tx_id()))]
    fn consents_by_user(
        &self,
        ctx: &mut dyn WorldState,
        user_id: &str,
    ) -> Result<Vec<Consent>, ConsentError> {
        self.query(ctx, QuerySelector::field_eq(USER_FIELD, user_id))
    }
}

/// Drain a cursor into documents. The first failure discards everything
/// gathered so far; the cursor is released on every path.
fn collect_consents(results: StateIterator<'_>) -> Result<Vec<Consent>, ConsentError> {
    let mut consents = Vec::new();
    for entry in results {
        let entry = entry?;
        consents.push(Consent::from_bytes(&entry.key, &entry.value)?);
    }
    Ok(consents)
}
