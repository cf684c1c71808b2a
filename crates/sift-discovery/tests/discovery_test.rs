use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sift_core::config::DiscoveryConfig;
use sift_core::errors::{OracleError, SiftResult};
use sift_core::models::{Label, LabelSource, NewMessage, ProposalStatus};
use sift_core::taxonomy::Taxonomy;
use sift_core::traits::{IMessageStore, INamingOracle, NamingRequest, NamingVerdict};
use sift_discovery::DiscoveryEngine;
use sift_storage::StorageEngine;

// ── Mock oracle ───────────────────────────────────────────────────────────

struct MockOracle {
    calls: AtomicUsize,
    response: fn(&NamingRequest) -> SiftResult<NamingVerdict>,
}

impl MockOracle {
    fn proposing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: |request| {
                Ok(NamingVerdict::NewCategory {
                    name: format!("discovered_{}", request.cluster_size),
                    description: "a new kind of email".to_string(),
                    reasoning: "distinct vocabulary".to_string(),
                })
            },
        }
    }

    fn malformed() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: |_| {
                Err(OracleError::MalformedResponse {
                    detail: "not json".to_string(),
                }
                .into())
            },
        }
    }

    fn declining() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: |_| {
                Ok(NamingVerdict::NoNewCategory {
                    reasoning: "fits existing categories".to_string(),
                })
            },
        }
    }
}

impl INamingOracle for MockOracle {
    fn propose(&self, request: &NamingRequest) -> SiftResult<NamingVerdict> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.response)(request)
    }
}

// ── Fixtures ──────────────────────────────────────────────────────────────

fn test_config() -> DiscoveryConfig {
    DiscoveryConfig {
        min_cluster_size: 3,
        eps: 0.5,
        min_samples: 3,
        ..DiscoveryConfig::default()
    }
}

/// Insert `count` near-identical messages and label them per `labels`
/// (cycled). Returns their ids.
fn seed_group(
    store: &StorageEngine,
    prefix: &str,
    text: &str,
    count: usize,
    labels: &[&str],
    start_date: i64,
) -> Vec<i64> {
    let mut ids = Vec::new();
    for i in 0..count {
        store
            .insert_message(&NewMessage {
                provider_id: format!("{prefix}-{i}"),
                account: "a@example.com".to_string(),
                thread_id: None,
                internal_date: start_date + i as i64,
                from_addr: format!("{prefix}@example.com"),
                to_addr: "a@example.com".to_string(),
                subject: text.to_string(),
                snippet: String::new(),
                body: format!("{text} {text} variation{i}"),
                provider_labels: vec![],
            })
            .unwrap();
        let id = store.unlabeled_messages(1).unwrap()[0].id;
        let category = labels[i % labels.len()];
        store
            .upsert_label(&Label::new(id, category, 0.4, LabelSource::Model))
            .unwrap();
        ids.push(id);
    }
    ids
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[test]
fn discovery_below_candidate_minimum_returns_no_clusters() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let oracle = Arc::new(MockOracle::proposing());
    // min_cluster_size 3 -> needs 6 candidates; seed exactly 5.
    let ids = seed_group(
        &store,
        "crypto",
        "bitcoin exchange price alert trading",
        5,
        &["travel", "personal"],
        0,
    );

    let engine = DiscoveryEngine::new(
        store.clone(),
        Some(oracle.clone()),
        Taxonomy::default(),
        test_config(),
    );
    let report = engine.discover(&ids).unwrap();
    assert_eq!(report.clusters, 0);
    assert!(report.proposals.is_empty());
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn heterogeneous_cluster_produces_a_pending_proposal() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let oracle = Arc::new(MockOracle::proposing());
    // 10 similar messages, labels split 60/40: eligible for proposal.
    let ids = seed_group(
        &store,
        "crypto",
        "bitcoin exchange price alert trading wallet",
        10,
        &["travel", "travel", "travel", "personal", "personal"],
        0,
    );

    let engine = DiscoveryEngine::new(
        store.clone(),
        Some(oracle.clone()),
        Taxonomy::default(),
        test_config(),
    );
    let report = engine.discover(&ids).unwrap();

    assert_eq!(report.clusters, 1);
    assert_eq!(report.proposals.len(), 1);
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);

    let pending = store.pending_proposals().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].status, ProposalStatus::Pending);
    assert_eq!(pending[0].cluster_size, 10);
    assert_eq!(pending[0].sample_message_ids.len(), 3);
}

#[test]
fn homogeneous_cluster_is_never_proposed() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let oracle = Arc::new(MockOracle::proposing());
    // 20 similar messages, 85% labeled travel: just low-confidence noise
    // inside a known category.
    let labels = [
        "travel", "travel", "travel", "travel", "travel", "travel", "travel", "travel", "travel",
        "travel", "travel", "travel", "travel", "travel", "travel", "travel", "travel",
        "personal", "personal", "personal",
    ];
    let ids = seed_group(
        &store,
        "flights",
        "airline flight booking gate boarding",
        20,
        &labels,
        0,
    );

    let engine = DiscoveryEngine::new(
        store.clone(),
        Some(oracle.clone()),
        Taxonomy::default(),
        test_config(),
    );
    let report = engine.discover(&ids).unwrap();

    assert_eq!(report.clusters, 1);
    assert!(report.proposals.is_empty());
    // The oracle is never consulted for a homogeneous cluster.
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    assert!(store.pending_proposals().unwrap().is_empty());
}

#[test]
fn malformed_oracle_response_drops_only_that_proposal() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let oracle = Arc::new(MockOracle::malformed());
    let ids = seed_group(
        &store,
        "crypto",
        "bitcoin exchange price alert trading wallet",
        10,
        &["travel", "personal"],
        0,
    );

    let engine = DiscoveryEngine::new(
        store.clone(),
        Some(oracle.clone()),
        Taxonomy::default(),
        test_config(),
    );
    // The pass itself succeeds.
    let report = engine.discover(&ids).unwrap();
    assert_eq!(report.clusters, 1);
    assert!(report.proposals.is_empty());
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
    assert!(store.pending_proposals().unwrap().is_empty());
}

#[test]
fn declining_oracle_records_nothing() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let oracle = Arc::new(MockOracle::declining());
    let ids = seed_group(
        &store,
        "crypto",
        "bitcoin exchange price alert trading wallet",
        10,
        &["travel", "personal"],
        0,
    );

    let engine = DiscoveryEngine::new(
        store.clone(),
        Some(oracle.clone()),
        Taxonomy::default(),
        test_config(),
    );
    let report = engine.discover(&ids).unwrap();
    assert!(report.proposals.is_empty());
    assert!(store.pending_proposals().unwrap().is_empty());
}

#[test]
fn partition_fallback_runs_when_density_finds_nothing() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let oracle = Arc::new(MockOracle::proposing());
    // A radius so tight that density clustering sees only noise.
    let config = DiscoveryConfig {
        min_cluster_size: 3,
        eps: 0.01,
        min_samples: 3,
        ..DiscoveryConfig::default()
    };

    let mut ids = seed_group(
        &store,
        "crypto",
        "bitcoin exchange price alert trading wallet",
        20,
        &["travel", "personal"],
        0,
    );
    ids.extend(seed_group(
        &store,
        "rides",
        "driver trip pickup fare receipt route",
        20,
        &["personal", "shopping_orders"],
        100,
    ));

    let engine = DiscoveryEngine::new(
        store.clone(),
        Some(oracle),
        Taxonomy::default(),
        config,
    );
    let report = engine.discover(&ids).unwrap();

    // k = min(5, 40 / 20) = 2 partitions, both past the size filter.
    assert_eq!(report.clusters, 2);
}

#[test]
fn review_transitions_move_proposals_out_of_pending() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let oracle = Arc::new(MockOracle::proposing());
    let ids = seed_group(
        &store,
        "crypto",
        "bitcoin exchange price alert trading wallet",
        10,
        &["travel", "personal"],
        0,
    );

    let engine = DiscoveryEngine::new(
        store.clone(),
        Some(oracle),
        Taxonomy::default(),
        test_config(),
    );
    engine.discover(&ids).unwrap();

    let pending = engine.pending_proposals().unwrap();
    assert_eq!(pending.len(), 1);
    engine.accept_proposal(pending[0].id).unwrap();
    assert!(engine.pending_proposals().unwrap().is_empty());
    // Terminal states are final.
    assert!(engine.reject_proposal(pending[0].id).is_err());
}

#[test]
fn without_oracle_clusters_are_found_but_nothing_is_proposed() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let ids = seed_group(
        &store,
        "crypto",
        "bitcoin exchange price alert trading wallet",
        10,
        &["travel", "personal"],
        0,
    );

    let engine = DiscoveryEngine::new(store.clone(), None, Taxonomy::default(), test_config());
    let report = engine.discover(&ids).unwrap();
    assert_eq!(report.clusters, 1);
    assert!(report.proposals.is_empty());
    assert!(store.pending_proposals().unwrap().is_empty());
}
