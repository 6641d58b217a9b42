//! # Concurrency and Atomicity
//!
//! Concurrent invocations are serialized by commit-time validation: a
//! transaction whose reads were overtaken is rejected and nothing it wrote
//! becomes visible.

#[cfg(test)]
mod tests {
    use crate::fixtures::{consent, create, memory_host, NAMESPACE};
    use consent_contract::{ConsentApi, ConsentError, ConsentService, ContractError};
    use shared_types::WorldState;
    use std::sync::Arc;
    use std::thread;
    use world_state::{Ledger, LedgerError};

    #[test]
    fn test_racing_creates_conflict_at_commit() {
        let ledger = Ledger::in_memory();
        let service = ConsentService::new();

        let mut first = ledger.begin(NAMESPACE).unwrap();
        let mut second = ledger.begin(NAMESPACE).unwrap();
        service
            .create_consent(&mut first, consent("c1", "u1", "JIO"))
            .unwrap();
        service
            .create_consent(&mut second, consent("c1", "u2", "Airtel"))
            .unwrap();

        first.commit().unwrap();
        let err = second.commit().unwrap_err();
        assert!(matches!(err, LedgerError::MvccReadConflict { ref key, .. } if key == "c1"));

        let mut reader = ledger.begin(NAMESPACE).unwrap();
        assert_eq!(service.read_consent(&mut reader, "c1").unwrap().user_id, "u1");
    }

    #[test]
    fn test_scan_overtaken_by_insert_is_rejected() {
        let ledger = Ledger::in_memory();
        let service = ConsentService::new();

        let mut auditor = ledger.begin(NAMESPACE).unwrap();
        assert!(service.all_consents(&mut auditor).unwrap().is_empty());
        auditor.put_state("audit", b"{}".to_vec()).unwrap();

        let mut writer = ledger.begin(NAMESPACE).unwrap();
        service
            .create_consent(&mut writer, consent("late", "u1", "JIO"))
            .unwrap();
        writer.commit().unwrap();

        assert!(matches!(
            auditor.commit(),
            Err(LedgerError::PhantomReadConflict { .. })
        ));
    }

    #[test]
    fn test_parallel_creates_of_one_id() {
        let host = Arc::new(memory_host().unwrap());
        let workers = 8;

        let handles: Vec<_> = (0..workers)
            .map(|i| {
                let host = Arc::clone(&host);
                thread::spawn(move || {
                    host.invoke(&create(&consent("shared", &format!("u{i}"), "JIO")))
                })
            })
            .collect();
        let responses: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let winners = responses.iter().filter(|r| r.is_success()).count();
        assert_eq!(winners, 1);
        for loser in responses.iter().filter(|r| !r.is_success()) {
            assert!(
                loser.message.contains("already exists") || loser.message.contains("conflict"),
                "{}",
                loser.message
            );
        }

        let stats = host.stats();
        assert_eq!(stats.invocations, workers);
        assert_eq!(stats.committed, 1);
    }

    #[test]
    fn test_failed_invocation_is_all_or_nothing() {
        let ledger = Ledger::in_memory();
        let service = ConsentService::new();
        ledger
            .execute(NAMESPACE, |tx| -> Result<(), ContractError> {
                Ok(service.create_consent(tx, consent("existing", "u1", "JIO"))?)
            })
            .unwrap();

        let result = ledger.execute(NAMESPACE, |tx| -> Result<(), ContractError> {
            service.create_consent(tx, consent("fresh", "u2", "JIO"))?;
            service.delete_consent(tx, "existing")?;
            Ok(service.create_consent(tx, consent("existing", "u3", "JIO"))?)
        });
        // Reads see committed state, so "existing" still exists here.
        assert!(matches!(
            result,
            Err(ContractError::Consent(ConsentError::AlreadyExists { .. }))
        ));

        let mut reader = ledger.begin(NAMESPACE).unwrap();
        assert!(!service.consent_exists(&mut reader, "fresh").unwrap());
        assert!(service.consent_exists(&mut reader, "existing").unwrap());
        assert_eq!(ledger.sequence(), 1);
    }

    #[test]
    fn test_cursors_released_after_failures() {
        let ledger = Ledger::in_memory();
        let service = ConsentService::new();
        ledger
            .execute(NAMESPACE, |tx| -> Result<(), LedgerError> {
                tx.put_state("a", br#"{"broken": true}"#.to_vec())?;
                Ok(())
            })
            .unwrap();

        let mut tx = ledger.begin(NAMESPACE).unwrap();
        assert!(service.all_consents(&mut tx).is_err());
        assert!(service.consents_by_user(&mut tx, "u1").unwrap().is_empty());
        assert_eq!(ledger.open_cursors(), 0);
    }
}
