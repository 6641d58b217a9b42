//! # Runtime Flows
//!
//! The node container and its JSON-lines endpoint, driven end to end.

#[cfg(test)]
mod tests {
    use consent_contract::InvocationResponse;
    use node_runtime::container::{BackendKind, NodeConfig};
    use node_runtime::{serve, NodeContainer, ServeSummary};

    fn decode(output: &[u8]) -> Vec<InvocationResponse> {
        String::from_utf8_lossy(output)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_session_over_seeded_memory_node() {
        let config = NodeConfig::from_lookup(|name| match name {
            "CONSENT_SEED_ON_START" => Some("true".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.storage.backend, BackendKind::Memory);
        let container = NodeContainer::new(config).unwrap();

        let session = [
            r#"{"function":"GetConsentsByProvider","args":["JIO"]}"#,
            r#"{"function":"CreateConsent","args":["c9","u1","svc","JIO","true","2023-05-01","2024-05-01","analytics"]}"#,
            r#"{"function":"GetConsentsByProvider","args":["JIO"]}"#,
            r#"{"function":"CreateConsent","args":["c9","u1","svc","JIO","true","2023-05-01","2024-05-01","analytics"]}"#,
            r#"{"function":"UpdateConsent","args":["consent2","user2","data-sharing","Airtel","TRUE","2023-01-02","2025-01-02","marketing"]}"#,
            r#"{"function":"ReadConsent","args":["consent2"]}"#,
        ]
        .join("\n");
        let mut output = Vec::new();

        let summary = serve(container.host(), session.as_bytes(), &mut output)
            .await
            .unwrap();
        assert_eq!(summary, ServeSummary { requests: 6, failures: 1 });

        let responses = decode(&output);
        assert_eq!(responses[0].payload.as_array().unwrap().len(), 2);
        assert_eq!(responses[2].payload.as_array().unwrap().len(), 3);
        assert_eq!(responses[3].message, "the consent c9 already exists");
        assert_eq!(responses[5].payload["consentGiven"], true);
        assert_eq!(responses[5].payload["expirationDate"], "2025-01-02");

        // Seed plus the create and the update.
        assert_eq!(container.host().ledger().sequence(), 3);
    }

    #[tokio::test]
    async fn test_tx_ids_are_unique_per_invocation() {
        let container = NodeContainer::new(NodeConfig::default()).unwrap();
        let session = "{\"function\":\"GetAllConsents\"}\n".repeat(3);
        let mut output = Vec::new();

        serve(container.host(), session.as_bytes(), &mut output)
            .await
            .unwrap();

        let mut tx_ids: Vec<String> = decode(&output)
            .into_iter()
            .map(|r| r.tx_id.unwrap())
            .collect();
        tx_ids.sort();
        tx_ids.dedup();
        assert_eq!(tx_ids.len(), 3);
    }
}
