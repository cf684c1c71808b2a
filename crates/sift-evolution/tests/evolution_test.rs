use std::path::Path;
use std::sync::Arc;

use sift_classifier::ClassifierEngine;
use sift_core::config::{ClassifierConfig, DiscoveryConfig, EvolutionConfig, TrainingConfig};
use sift_core::errors::{SiftError, SiftResult};
use sift_core::models::{Label, LabelSource, NewMessage};
use sift_core::taxonomy::Taxonomy;
use sift_core::traits::{IMailSource, IMessageStore, MailAccount};
use sift_discovery::DiscoveryEngine;
use sift_evolution::EvolutionEngine;
use sift_storage::StorageEngine;
use sift_training::TrainingEngine;

// ── Mock mail source ──────────────────────────────────────────────────────

struct MockMail {
    messages: Vec<NewMessage>,
    fail: bool,
}

impl IMailSource for MockMail {
    fn authenticated_accounts(&self) -> SiftResult<Vec<MailAccount>> {
        Ok(vec![MailAccount {
            address: "a@example.com".to_string(),
        }])
    }

    fn fetch_new(
        &self,
        _account: &MailAccount,
        _since: Option<i64>,
    ) -> SiftResult<Vec<NewMessage>> {
        if self.fail {
            return Err(SiftError::Ingest {
                message: "provider unavailable".to_string(),
            });
        }
        Ok(self.messages.clone())
    }
}

// ── Fixtures ──────────────────────────────────────────────────────────────

fn new_message(provider_id: &str, subject: &str, body: &str, date: i64) -> NewMessage {
    NewMessage {
        provider_id: provider_id.to_string(),
        account: "a@example.com".to_string(),
        thread_id: None,
        internal_date: date,
        from_addr: "sender@example.com".to_string(),
        to_addr: "a@example.com".to_string(),
        subject: subject.to_string(),
        snippet: String::new(),
        body: body.to_string(),
        provider_labels: vec![],
    }
}

fn build_engine(
    store: Arc<StorageEngine>,
    mail: Option<Arc<dyn IMailSource>>,
    model_dir: &Path,
    evolution: EvolutionConfig,
) -> EvolutionEngine {
    let discovery_config = DiscoveryConfig::default();
    let discovery_minimum = discovery_config.min_candidates();
    EvolutionEngine::new(
        store.clone(),
        mail,
        ClassifierEngine::new(
            store.clone(),
            ClassifierConfig::default(),
            model_dir.to_path_buf(),
        ),
        DiscoveryEngine::new(store.clone(), None, Taxonomy::default(), discovery_config),
        TrainingEngine::new(store, TrainingConfig::default(), model_dir.to_path_buf()),
        evolution,
        discovery_minimum,
    )
}

fn seed_labeled_corpus(store: &StorageEngine) {
    for i in 0..15 {
        store
            .insert_message(&new_message(
                &format!("t{i}"),
                "flight itinerary",
                "airline flight booking gate itinerary boarding",
                i,
            ))
            .unwrap();
        let id = store.unlabeled_messages(1).unwrap()[0].id;
        store
            .upsert_label(&Label::new(id, "travel", 1.0, LabelSource::Manual))
            .unwrap();
    }
    for i in 0..15 {
        store
            .insert_message(&new_message(
                &format!("f{i}"),
                "payment receipt",
                "invoice payment receipt statement renewal subscription",
                100 + i,
            ))
            .unwrap();
        let id = store.unlabeled_messages(1).unwrap()[0].id;
        store
            .upsert_label(&Label::new(id, "finance_receipt", 1.0, LabelSource::Manual))
            .unwrap();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[test]
fn degraded_cycle_still_produces_a_full_summary() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let engine = build_engine(store, None, dir.path(), EvolutionConfig::default());

    let summary = engine.run_cycle();

    assert_eq!(summary.ingested, 0);
    assert_eq!(summary.classified, 0);
    assert_eq!(summary.uncertain, 0);
    assert_eq!(summary.proposals, 0);
    assert!(!summary.retrained);
    assert!(summary.accuracy.is_none());
    // Every skipped stage left a note, so operators can tell "nothing to
    // do" from "something failed".
    assert!(summary.notes.iter().any(|n| n.contains("ingest skipped")));
    assert!(summary.notes.iter().any(|n| n.contains("discovery skipped")));
    assert!(summary.notes.iter().any(|n| n.contains("retrain skipped")));
}

#[test]
fn ingestion_failure_does_not_abort_later_stages() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    seed_labeled_corpus(&store);

    // Train a model so the classify stage has something to run with.
    let trainer = TrainingEngine::new(
        store.clone(),
        TrainingConfig::default(),
        dir.path().to_path_buf(),
    );
    trainer
        .train_and_version(sift_core::models::TrainingTrigger::Manual)
        .unwrap();

    // New unlabeled backlog plus a failing provider.
    store
        .insert_message(&new_message(
            "u1",
            "trip",
            "airline flight booking gate",
            1000,
        ))
        .unwrap();
    let mail: Arc<dyn IMailSource> = Arc::new(MockMail {
        messages: vec![],
        fail: true,
    });

    let engine = build_engine(store, Some(mail), dir.path(), EvolutionConfig::default());
    let summary = engine.run_cycle();

    assert!(summary.notes.iter().any(|n| n.contains("ingest failed")));
    // Classification still ran over the backlog.
    assert_eq!(summary.classified, 1);
}

#[test]
fn ingest_stores_only_new_messages() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let mail: Arc<dyn IMailSource> = Arc::new(MockMail {
        messages: vec![
            new_message("m1", "a", "body one", 1),
            new_message("m2", "b", "body two", 2),
            new_message("m3", "c", "body three", 3),
        ],
        fail: false,
    });

    let engine = build_engine(
        store.clone(),
        Some(mail),
        dir.path(),
        EvolutionConfig::default(),
    );

    let first = engine.run_cycle();
    assert_eq!(first.ingested, 3);

    // The provider returns the same messages again; insert-if-absent makes
    // the second cycle a no-op.
    let second = engine.run_cycle();
    assert_eq!(second.ingested, 0);
    assert_eq!(store.message_count().unwrap(), 3);
}

#[test]
fn retrain_gate_requires_net_new_labels() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let config = EvolutionConfig {
        min_new_labels_for_retrain: 5,
        ..EvolutionConfig::default()
    };

    // One label short of the threshold: no retrain.
    for i in 0..4 {
        store
            .insert_message(&new_message(&format!("m{i}"), "s", "body text here", i))
            .unwrap();
        let id = store.unlabeled_messages(1).unwrap()[0].id;
        store
            .upsert_label(&Label::new(id, "personal", 1.0, LabelSource::Manual))
            .unwrap();
    }
    let engine = build_engine(store.clone(), None, dir.path(), config.clone());
    let summary = engine.run_cycle();
    assert!(!summary.retrained);
    assert_eq!(store.model_version_count().unwrap(), 0);
    assert!(summary
        .notes
        .iter()
        .any(|n| n.contains("retrain skipped: 4 new labels")));

    // Crossing the threshold triggers the retrain.
    store
        .insert_message(&new_message("m4", "s", "body text here", 10))
        .unwrap();
    let id = store.unlabeled_messages(1).unwrap()[0].id;
    store
        .upsert_label(&Label::new(id, "personal", 1.0, LabelSource::Manual))
        .unwrap();

    let summary = engine.run_cycle();
    assert!(summary.retrained);
    assert_eq!(store.model_version_count().unwrap(), 1);
}

#[test]
fn second_cycle_classifies_with_the_model_from_the_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    seed_labeled_corpus(&store);

    let config = EvolutionConfig {
        min_new_labels_for_retrain: 5,
        ..EvolutionConfig::default()
    };
    let engine = build_engine(store.clone(), None, dir.path(), config);

    // First cycle: nothing to classify (no model yet), but 30 accumulated
    // labels cross the retrain gate.
    let first = engine.run_cycle();
    assert_eq!(first.classified, 0);
    assert!(first.retrained);
    assert!(first.accuracy.is_some());

    // A new unlabeled message arrives; the second cycle classifies it with
    // the freshly trained model, and the gate resets to net-new labels.
    store
        .insert_message(&new_message(
            "u1",
            "trip booking",
            "airline flight booking gate boarding",
            1000,
        ))
        .unwrap();
    let second = engine.run_cycle();
    assert_eq!(second.classified, 1);
    assert!(!second.retrained);

    let labeled = store.labeled_messages().unwrap();
    assert!(labeled
        .iter()
        .any(|l| l.source == LabelSource::Model && l.category == "travel"));
}
