//! # Consent Ledger Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | `query` | Provider lookup through the derived index vs a namespace scan |
//! | `commit` | One `CreateConsent` invocation end to end |

use consent_contract::{ConsentApi, ConsentService, ContractHost};
use consent_tests::fixtures::{consent, create, NAMESPACE};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use world_state::{IndexDefinition, InMemoryKVStore, Ledger, LedgerError};

const PROVIDERS: [&str; 4] = ["JIO", "Airtel", "Vi", "BSNL"];

fn populated_ledger(records: usize) -> Ledger<InMemoryKVStore> {
    let ledger = Ledger::in_memory();
    let service = ConsentService::new();
    for chunk in (0..records).collect::<Vec<_>>().chunks(500) {
        ledger
            .execute(NAMESPACE, |tx| -> Result<(), consent_contract::ContractError> {
                for i in chunk {
                    let provider = PROVIDERS[i % PROVIDERS.len()];
                    service.create_consent(tx, consent(&format!("c{i:06}"), &format!("u{}", i % 97), provider))?;
                }
                Ok(())
            })
            .unwrap_or_else(|e| panic!("populate: {e}"));
    }
    ledger
}

fn bench_provider_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    let service = ConsentService::new();

    for size in [1_000usize, 10_000] {
        let scanned = populated_ledger(size);
        let indexed = populated_ledger(size);
        indexed
            .define_index(NAMESPACE, vec![IndexDefinition::new("indexProvider", "provider")])
            .unwrap_or_else(|e: LedgerError| panic!("index: {e}"));

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("scan", size), &scanned, |b, ledger| {
            b.iter(|| {
                let mut tx = ledger.begin(NAMESPACE).unwrap_or_else(|e| panic!("{e}"));
                black_box(service.consents_by_provider(&mut tx, "Vi").map(|v| v.len()))
            })
        });
        group.bench_with_input(BenchmarkId::new("index", size), &indexed, |b, ledger| {
            b.iter(|| {
                let mut tx = ledger.begin(NAMESPACE).unwrap_or_else(|e| panic!("{e}"));
                black_box(service.consents_by_provider(&mut tx, "Vi").map(|v| v.len()))
            })
        });
    }
    group.finish();
}

fn bench_create_invocation(c: &mut Criterion) {
    let host = ContractHost::new(Arc::new(Ledger::in_memory()), NAMESPACE)
        .unwrap_or_else(|e| panic!("host: {e}"));
    let mut next = 0u64;

    c.bench_function("commit/create_consent", |b| {
        b.iter(|| {
            next += 1;
            let response = host.invoke(&create(&consent(&format!("bench{next}"), "u1", "JIO")));
            black_box(response.status)
        })
    });
}

criterion_group!(benches, bench_provider_query, bench_create_invocation);
criterion_main!(benches);
