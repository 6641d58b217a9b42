//! # Bootstrapper
//!
//! Seeds the example consents. Records are written with `put_state`
//! directly, without the existence check `create_consent` applies, so
//! seeding again overwrites the same three records instead of failing.

use crate::domain::entities::{Consent, PROVIDER_FIELD, USER_FIELD};
use crate::domain::errors::ConsentError;
use shared_types::WorldState;
use tracing::{debug, info, instrument};
use world_state::IndexDefinition;

/// The example records written by [`seed`].
pub fn seed_consents() -> Vec<Consent> {
    vec![
        example("consent1", "user1", "data-sharing", "JIO", true, 1, "analytics"),
        example("consent2", "user2", "data-sharing", "Airtel", false, 2, "marketing"),
        example(
            "consent3",
            "user3",
            "profile-access",
            "JIO",
            true,
            3,
            "service-improvement",
        ),
    ]
}

fn example(
    id: &str,
    user_id: &str,
    service: &str,
    provider: &str,
    consent_given: bool,
    day: u8,
    purpose: &str,
) -> Consent {
    Consent {
        id: id.to_string(),
        user_id: user_id.to_string(),
        service: service.to_string(),
        provider: provider.to_string(),
        consent_given,
        timestamp: format!("2023-01-{day:02}"),
        expiration_date: format!("2024-01-{day:02}"),
        purpose: purpose.to_string(),
    }
}

/// Overwrite the example records. Returns how many were written.
#[instrument(skip(ctx), fields(tx_id = %ctx.tx_id()))]
pub fn seed(ctx: &mut dyn WorldState) -> Result<usize, ConsentError> {
    let consents = seed_consents();
    for consent in &consents {
        ctx.put_state(&consent.id, consent.to_bytes()?)?;
        debug!(id = %consent.id, "Seeded consent");
    }
    info!(count = consents.len(), "Ledger seeded");
    Ok(consents.len())
}

/// Secondary indexes the consent namespace needs for provider and user
/// queries.
pub fn consent_indexes() -> Vec<IndexDefinition> {
    vec![
        IndexDefinition::new("indexProvider", PROVIDER_FIELD),
        IndexDefinition::new("indexUser", USER_FIELD),
    ]
}
