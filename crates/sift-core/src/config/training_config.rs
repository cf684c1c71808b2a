use serde::{Deserialize, Serialize};

use super::defaults;

/// Model training configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Vocabulary cap for the training vectorizer (unigrams + bigrams).
    pub max_features: usize,
    /// Trees in the ensemble.
    pub tree_count: usize,
    pub max_tree_depth: usize,
    pub min_leaf_samples: usize,
    /// Held-out fraction for evaluation.
    pub test_fraction: f64,
    /// Below this many labeled samples, fit on everything and record an
    /// insufficient-data marker instead of a score.
    pub min_eval_samples: usize,
    /// Seed for bootstrap sampling, feature subsampling, and splits.
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_features: defaults::DEFAULT_TRAINING_MAX_FEATURES,
            tree_count: defaults::DEFAULT_TREE_COUNT,
            max_tree_depth: defaults::DEFAULT_MAX_TREE_DEPTH,
            min_leaf_samples: defaults::DEFAULT_MIN_LEAF_SAMPLES,
            test_fraction: defaults::DEFAULT_TEST_FRACTION,
            min_eval_samples: defaults::DEFAULT_MIN_EVAL_SAMPLES,
            seed: defaults::DEFAULT_SEED,
        }
    }
}
