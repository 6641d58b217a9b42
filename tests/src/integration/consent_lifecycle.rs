//! # Consent Lifecycle Flows
//!
//! Contract operations invoked through `ContractHost`, each in its own
//! ledger transaction, the way a caller drives them.

#[cfg(test)]
mod tests {
    use crate::fixtures::{call, consent, create, memory_host, update};
    use consent_contract::{seed_consents, Consent, InvocationResponse};
    use serde_json::Value;
    use std::collections::BTreeSet;

    fn records(response: &InvocationResponse) -> Vec<Consent> {
        assert!(response.is_success(), "{}", response.message);
        serde_json::from_value(response.payload.clone()).unwrap()
    }

    fn ids(response: &InvocationResponse) -> BTreeSet<String> {
        records(response).into_iter().map(|c| c.id).collect()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // =========================================================================
    // CONCRETE SCENARIO
    // =========================================================================

    #[test]
    fn test_create_read_duplicate_delete_scenario() {
        let host = memory_host().unwrap();
        let c9 = consent("c9", "u1", "JIO");

        let created = host.invoke(&call(
            "CreateConsent",
            &["c9", "u1", "svc", "JIO", "true", "2023-05-01", "2024-05-01", "analytics"],
        ));
        assert!(created.is_success());

        let read = host.invoke(&call("ReadConsent", &["c9"]));
        let stored: Consent = serde_json::from_value(read.payload).unwrap();
        assert_eq!(stored, c9);

        let duplicate = host.invoke(&create(&consent("c9", "someone", "Airtel")));
        assert_eq!(duplicate.status, InvocationResponse::ERROR);
        assert_eq!(duplicate.message, "the consent c9 already exists");

        assert!(host.invoke(&call("DeleteConsent", &["c9"])).is_success());
        let gone = host.invoke(&call("ReadConsent", &["c9"]));
        assert_eq!(gone.message, "the consent c9 does not exist");
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    #[test]
    fn test_second_create_never_overwrites() {
        let host = memory_host().unwrap();
        for id in ["a", "b", "c"] {
            let first = consent(id, "u1", "JIO");
            assert!(host.invoke(&create(&first)).is_success());
            assert!(!host.invoke(&create(&consent(id, "u2", "Airtel"))).is_success());

            let read = host.invoke(&call("ReadConsent", &[id]));
            assert_eq!(serde_json::from_value::<Consent>(read.payload).unwrap(), first);
        }
    }

    #[test]
    fn test_missing_ids_are_not_found() {
        let host = memory_host().unwrap();
        assert!(host.invoke(&create(&consent("deleted", "u1", "JIO"))).is_success());
        assert!(host.invoke(&call("DeleteConsent", &["deleted"])).is_success());

        for id in ["never-created", "deleted"] {
            let expected = format!("the consent {id} does not exist");
            assert_eq!(host.invoke(&call("ReadConsent", &[id])).message, expected);
            assert_eq!(
                host.invoke(&update(&consent(id, "u1", "JIO"))).message,
                expected
            );
            assert_eq!(host.invoke(&call("DeleteConsent", &[id])).message, expected);
            assert_eq!(
                host.invoke(&call("ConsentExists", &[id])).payload,
                Value::Bool(false)
            );
        }
    }

    #[test]
    fn test_update_leaves_no_residue() {
        let host = memory_host().unwrap();
        let original = Consent {
            purpose: "analytics".into(),
            consent_given: true,
            ..consent("c1", "u1", "JIO")
        };
        assert!(host.invoke(&create(&original)).is_success());

        let replacement = Consent {
            service: "profile-access".into(),
            purpose: "marketing".into(),
            consent_given: false,
            timestamp: "2023-09-09".into(),
            expiration_date: "2025-09-09".into(),
            ..consent("c1", "u2", "Airtel")
        };
        assert!(host.invoke(&update(&replacement)).is_success());

        let read = host.invoke(&call("ReadConsent", &["c1"]));
        assert_eq!(serde_json::from_value::<Consent>(read.payload).unwrap(), replacement);

        // The old provider/user no longer find it.
        assert!(ids(&host.invoke(&call("GetConsentsByProvider", &["JIO"]))).is_empty());
        assert!(ids(&host.invoke(&call("GetConsentsByUser", &["u1"]))).is_empty());
    }

    #[test]
    fn test_provider_query_tracks_current_state() {
        let host = memory_host().unwrap();
        for (id, provider) in [("p1", "JIO"), ("p2", "Airtel"), ("p3", "JIO"), ("p4", "JIO")] {
            assert!(host.invoke(&create(&consent(id, "u", provider))).is_success());
        }
        // Move p1 away from JIO, delete p3, move p2 to JIO.
        assert!(host.invoke(&update(&consent("p1", "u", "Airtel"))).is_success());
        assert!(host.invoke(&call("DeleteConsent", &["p3"])).is_success());
        assert!(host.invoke(&update(&consent("p2", "u", "JIO"))).is_success());

        let jio = host.invoke(&call("GetConsentsByProvider", &["JIO"]));
        assert_eq!(ids(&jio), set(&["p2", "p4"]));
        assert!(records(&jio).iter().all(|c| c.provider == "JIO"));

        let airtel = host.invoke(&call("GetConsentsByProvider", &["Airtel"]));
        assert_eq!(ids(&airtel), set(&["p1"]));
    }

    #[test]
    fn test_init_ledger_twice() {
        let host = memory_host().unwrap();
        assert!(host.invoke(&call("InitLedger", &[])).is_success());
        assert!(host.invoke(&call("InitLedger", &[])).is_success());

        let mut all = records(&host.invoke(&call("GetAllConsents", &[])));
        all.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(all, seed_consents());

        // Seeded records still go through create's existence check.
        let duplicate = host.invoke(&create(&consent("consent1", "u", "JIO")));
        assert_eq!(duplicate.message, "the consent consent1 already exists");
    }

    #[test]
    fn test_user_query_after_seed() {
        let host = memory_host().unwrap();
        assert!(host.init_ledger().is_success());
        assert!(host.invoke(&create(&consent("extra", "user1", "Airtel"))).is_success());

        let user1 = host.invoke(&call("GetConsentsByUser", &["user1"]));
        assert_eq!(ids(&user1), set(&["consent1", "extra"]));
        assert!(ids(&host.invoke(&call("GetConsentsByUser", &["nobody"]))).is_empty());
    }

    #[test]
    fn test_argument_errors_touch_nothing() {
        let host = memory_host().unwrap();
        let before = host.ledger().sequence();

        let bad_bool = host.invoke(&call(
            "CreateConsent",
            &["c1", "u1", "svc", "JIO", "sure", "2023-05-01", "2024-05-01", "x"],
        ));
        assert_eq!(bad_bool.status, InvocationResponse::BAD_REQUEST);
        assert!(host.invoke(&call("ReadConsent", &[])).message.contains("expects 1"));
        assert!(host.invoke(&call("DropTable", &["consents"])).message.contains("unknown function"));

        assert_eq!(host.ledger().sequence(), before);
        assert_eq!(
            host.invoke(&call("ConsentExists", &["c1"])).payload,
            Value::Bool(false)
        );
    }
}
