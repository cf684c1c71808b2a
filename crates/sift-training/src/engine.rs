//! TrainingEngine — trains from all labeled messages, evaluates, persists
//! artifacts, and records lineage.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use sift_core::config::TrainingConfig;
use sift_core::errors::SiftResult;
use sift_core::models::{ModelScore, ModelVersion, TrainingTrigger};
use sift_core::traits::IMessageStore;
use sift_text::{TfidfConfig, TfidfVectorizer};

use crate::artifact::ModelArtifact;
use crate::evaluation::{evaluate, stratified_split};
use crate::forest::{ForestConfig, RandomForest};

/// Result of one training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub version: String,
    pub score: ModelScore,
    pub num_samples: usize,
}

/// The model version manager.
pub struct TrainingEngine {
    store: Arc<dyn IMessageStore>,
    config: TrainingConfig,
    model_dir: PathBuf,
}

impl TrainingEngine {
    pub fn new(store: Arc<dyn IMessageStore>, config: TrainingConfig, model_dir: PathBuf) -> Self {
        Self {
            store,
            config,
            model_dir,
        }
    }

    /// Train from all labeled messages, evaluate, persist a versioned
    /// artifact plus the latest pointer, and append the lineage row.
    ///
    /// Every run appends exactly one row, including runs with too little
    /// data to score; those carry an insufficient-data marker, and a run
    /// that produced no model never touches the latest pointer.
    pub fn train_and_version(&self, trigger: TrainingTrigger) -> SiftResult<TrainingOutcome> {
        let labeled = self.store.labeled_messages()?;
        let version = self.next_version()?;

        if labeled.is_empty() {
            warn!(version = %version, "no labeled messages; recording marker version only");
            let row = ModelVersion {
                version: version.clone(),
                artifact_path: None,
                num_samples: 0,
                num_categories: 0,
                score: ModelScore::InsufficientData,
                report: None,
                trigger,
                created_at: Utc::now(),
            };
            self.store.append_model_version(&row)?;
            return Ok(TrainingOutcome {
                version,
                score: ModelScore::InsufficientData,
                num_samples: 0,
            });
        }

        let texts: Vec<String> = labeled.iter().map(|l| l.message.feature_text()).collect();
        let mut categories: Vec<String> = labeled.iter().map(|l| l.category.clone()).collect();
        categories.sort();
        categories.dedup();
        let class_of = |category: &str| {
            categories
                .iter()
                .position(|c| c == category)
                .unwrap_or(0)
        };
        let labels: Vec<usize> = labeled.iter().map(|l| class_of(&l.category)).collect();

        info!(
            samples = labeled.len(),
            categories = categories.len(),
            version = %version,
            "training classifier"
        );

        let vectorizer_config = TfidfConfig {
            max_features: self.config.max_features,
            ngram_max: 2,
            sublinear_tf: true,
        };
        let forest_config = ForestConfig {
            tree_count: self.config.tree_count,
            max_depth: self.config.max_tree_depth,
            min_leaf_samples: self.config.min_leaf_samples,
            seed: self.config.seed,
        };

        let (score, report, artifact) = if labeled.len() < self.config.min_eval_samples {
            warn!(
                samples = labeled.len(),
                minimum = self.config.min_eval_samples,
                "too few samples for a held-out split; fitting on all data without evaluation"
            );
            let vectorizer = TfidfVectorizer::fit(vectorizer_config, &texts);
            let samples = vectorizer.transform_all(&texts);
            let n_features = vectorizer.len();
            let forest =
                RandomForest::fit(&samples, &labels, categories.len(), n_features, &forest_config);
            let artifact = ModelArtifact {
                categories: categories.clone(),
                vectorizer,
                forest,
                trained_at: Utc::now(),
            };
            (ModelScore::InsufficientData, None, artifact)
        } else {
            let (train_idx, test_idx) = stratified_split(
                &labels,
                categories.len(),
                self.config.test_fraction,
                self.config.seed,
            );
            let train_texts: Vec<String> = train_idx.iter().map(|&i| texts[i].clone()).collect();
            let train_labels: Vec<usize> = train_idx.iter().map(|&i| labels[i]).collect();

            let vectorizer = TfidfVectorizer::fit(vectorizer_config, &train_texts);
            let train_samples = vectorizer.transform_all(&train_texts);
            let n_features = vectorizer.len();
            let forest = RandomForest::fit(
                &train_samples,
                &train_labels,
                categories.len(),
                n_features,
                &forest_config,
            );

            let truth: Vec<usize> = test_idx.iter().map(|&i| labels[i]).collect();
            let predicted: Vec<usize> = test_idx
                .iter()
                .map(|&i| forest.predict(&vectorizer.transform(&texts[i])))
                .collect();
            let report = evaluate(&categories, &truth, &predicted, train_idx.len());

            info!(
                accuracy = report.accuracy,
                macro_f1 = report.macro_f1,
                test_samples = report.test_samples,
                "evaluation complete"
            );

            let artifact = ModelArtifact {
                categories: categories.clone(),
                vectorizer,
                forest,
                trained_at: Utc::now(),
            };
            (
                ModelScore::Evaluated {
                    accuracy: report.accuracy,
                    macro_f1: report.macro_f1,
                },
                Some(report),
                artifact,
            )
        };

        let versioned_path = artifact.save_versioned(&self.model_dir, &version)?;
        artifact.replace_latest(&self.model_dir)?;
        info!(path = %versioned_path.display(), version = %version, "model artifact written");

        let row = ModelVersion {
            version: version.clone(),
            artifact_path: Some(versioned_path.display().to_string()),
            num_samples: labeled.len(),
            num_categories: categories.len(),
            score,
            report,
            trigger,
            created_at: Utc::now(),
        };
        self.store.append_model_version(&row)?;

        Ok(TrainingOutcome {
            version,
            score,
            num_samples: labeled.len(),
        })
    }

    /// Version id: ordinal plus creation timestamp, unique and sortable.
    fn next_version(&self) -> SiftResult<String> {
        let ordinal = self.store.model_version_count()? + 1;
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        Ok(format!("v{ordinal}_{timestamp}"))
    }
}
