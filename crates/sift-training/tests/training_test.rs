use std::sync::Arc;

use sift_core::config::TrainingConfig;
use sift_core::models::{Label, LabelSource, ModelScore, NewMessage, TrainingTrigger};
use sift_core::traits::IMessageStore;
use sift_storage::StorageEngine;
use sift_training::{ModelArtifact, TrainingEngine};

fn seed_labeled(store: &StorageEngine, category: &str, texts: &[&str], start: i64) {
    for (i, text) in texts.iter().enumerate() {
        let provider_id = format!("{category}-{i}");
        store
            .insert_message(&NewMessage {
                provider_id: provider_id.clone(),
                account: "a@example.com".to_string(),
                thread_id: None,
                internal_date: start + i as i64,
                from_addr: format!("{category}@example.com"),
                to_addr: "a@example.com".to_string(),
                subject: text.to_string(),
                snippet: String::new(),
                body: text.repeat(3),
                provider_labels: vec![],
            })
            .unwrap();
    }
    // Label everything that is still unlabeled with this category.
    for message in store.unlabeled_messages(1000).unwrap() {
        store
            .upsert_label(&Label::new(message.id, category, 1.0, LabelSource::Manual))
            .unwrap();
    }
}

#[test]
fn zero_labeled_messages_appends_marker_row_only() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let engine = TrainingEngine::new(
        store.clone(),
        TrainingConfig::default(),
        dir.path().to_path_buf(),
    );

    let outcome = engine.train_and_version(TrainingTrigger::Manual).unwrap();
    assert_eq!(outcome.score, ModelScore::InsufficientData);
    assert_eq!(outcome.num_samples, 0);

    // Version count increments by exactly one even though nothing trained.
    assert_eq!(store.model_version_count().unwrap(), 1);
    let row = store.latest_model_version().unwrap().unwrap();
    assert_eq!(row.score.accuracy(), None);
    assert!(row.artifact_path.is_none());

    // The latest pointer was never touched.
    assert!(ModelArtifact::load_latest(dir.path()).unwrap().is_none());
}

#[test]
fn tiny_dataset_trains_without_evaluation() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    seed_labeled(&store, "travel", &["flight booking airline", "hotel booking trip"], 0);
    seed_labeled(&store, "finance_receipt", &["payment receipt invoice"], 100);

    let engine = TrainingEngine::new(
        store.clone(),
        TrainingConfig::default(),
        dir.path().to_path_buf(),
    );
    let outcome = engine.train_and_version(TrainingTrigger::Manual).unwrap();

    assert_eq!(outcome.score, ModelScore::InsufficientData);
    assert_eq!(outcome.num_samples, 3);

    // An artifact exists even without a score; it fit on all data.
    let artifact = ModelArtifact::load_latest(dir.path()).unwrap().unwrap();
    assert_eq!(artifact.categories, vec!["finance_receipt", "travel"]);

    let row = store.latest_model_version().unwrap().unwrap();
    assert_eq!(row.num_samples, 3);
    assert!(row.artifact_path.is_some());
    assert!(row.report.is_none());
}

#[test]
fn sufficient_data_produces_evaluated_version() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());

    let travel: Vec<String> = (0..15)
        .map(|i| format!("flight airline booking itinerary gate {i}"))
        .collect();
    let finance: Vec<String> = (0..15)
        .map(|i| format!("payment invoice receipt statement renewal {i}"))
        .collect();
    seed_labeled(
        &store,
        "travel",
        &travel.iter().map(String::as_str).collect::<Vec<_>>(),
        0,
    );
    seed_labeled(
        &store,
        "finance_receipt",
        &finance.iter().map(String::as_str).collect::<Vec<_>>(),
        100,
    );

    let engine = TrainingEngine::new(
        store.clone(),
        TrainingConfig::default(),
        dir.path().to_path_buf(),
    );
    let outcome = engine.train_and_version(TrainingTrigger::Auto).unwrap();

    assert_eq!(outcome.num_samples, 30);
    assert!(outcome.score.is_evaluated());
    // Clearly separable vocabulary: the held-out accuracy should be high.
    assert!(outcome.score.accuracy().unwrap() > 0.7);

    let row = store.latest_model_version().unwrap().unwrap();
    assert_eq!(row.trigger, TrainingTrigger::Auto);
    assert_eq!(row.num_categories, 2);
    let report = row.report.unwrap();
    assert_eq!(report.train_samples + report.test_samples, 30);
    assert_eq!(report.per_category.len(), 2);

    // The live artifact classifies an obvious travel text as travel.
    let artifact = ModelArtifact::load_latest(dir.path()).unwrap().unwrap();
    let (category, _) = artifact.predict("airline flight gate itinerary");
    assert_eq!(category, "travel");
}

#[test]
fn version_ordinals_increment_per_run() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let engine = TrainingEngine::new(
        store.clone(),
        TrainingConfig::default(),
        dir.path().to_path_buf(),
    );

    let first = engine.train_and_version(TrainingTrigger::Manual).unwrap();
    let second = engine.train_and_version(TrainingTrigger::Manual).unwrap();
    assert!(first.version.starts_with("v1_"));
    assert!(second.version.starts_with("v2_"));
    assert_eq!(store.model_version_count().unwrap(), 2);
}
