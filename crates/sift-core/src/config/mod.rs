//! Environment-style configuration with safe defaults.
//!
//! Every knob is read from a `SIFT_*` variable (the oracle key from
//! `ANTHROPIC_API_KEY`) and falls back to the defaults in [`defaults`].
//! Unparseable values are logged and replaced with the default rather than
//! aborting startup.

pub mod classifier_config;
pub mod defaults;
pub mod discovery_config;
pub mod evolution_config;
pub mod oracle_config;
pub mod training_config;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::warn;

pub use classifier_config::ClassifierConfig;
pub use discovery_config::DiscoveryConfig;
pub use evolution_config::EvolutionConfig;
pub use oracle_config::OracleConfig;
pub use training_config::TrainingConfig;

/// Top-level configuration for the whole pipeline.
#[derive(Debug, Clone)]
pub struct SiftConfig {
    pub data_dir: PathBuf,
    pub classifier: ClassifierConfig,
    pub discovery: DiscoveryConfig,
    pub training: TrainingConfig,
    pub evolution: EvolutionConfig,
    pub oracle: OracleConfig,
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(defaults::DEFAULT_DATA_DIR),
            classifier: ClassifierConfig::default(),
            discovery: DiscoveryConfig::default(),
            training: TrainingConfig::default(),
            evolution: EvolutionConfig::default(),
            oracle: OracleConfig::default(),
        }
    }
}

impl SiftConfig {
    /// Build a configuration from the process environment.
    pub fn from_env() -> Self {
        let data_dir = PathBuf::from(env_string("SIFT_DATA_DIR", defaults::DEFAULT_DATA_DIR));

        let classifier = ClassifierConfig {
            margin_threshold: env_parse(
                "SIFT_MARGIN_THRESHOLD",
                defaults::DEFAULT_MARGIN_THRESHOLD,
            ),
            confidence_threshold: env_parse(
                "SIFT_CONFIDENCE_THRESHOLD",
                defaults::DEFAULT_CONFIDENCE_THRESHOLD,
            ),
            batch_size: env_parse("SIFT_BATCH_SIZE", defaults::DEFAULT_BATCH_SIZE),
        };

        let discovery = DiscoveryConfig {
            min_cluster_size: env_parse(
                "SIFT_MIN_CLUSTER_SIZE",
                defaults::DEFAULT_MIN_CLUSTER_SIZE,
            ),
            eps: env_parse("SIFT_DBSCAN_EPS", defaults::DEFAULT_DBSCAN_EPS),
            min_samples: env_parse(
                "SIFT_DBSCAN_MIN_SAMPLES",
                defaults::DEFAULT_DBSCAN_MIN_SAMPLES,
            ),
            max_features: env_parse(
                "SIFT_DISCOVERY_MAX_FEATURES",
                defaults::DEFAULT_DISCOVERY_MAX_FEATURES,
            ),
            homogeneity_threshold: env_parse(
                "SIFT_DISCOVERY_HOMOGENEITY_THRESHOLD",
                defaults::DEFAULT_HOMOGENEITY_THRESHOLD,
            ),
            fallback_max_clusters: env_parse(
                "SIFT_DISCOVERY_FALLBACK_MAX_CLUSTERS",
                defaults::DEFAULT_FALLBACK_MAX_CLUSTERS,
            ),
        };

        let training = TrainingConfig {
            max_features: env_parse(
                "SIFT_TRAINING_MAX_FEATURES",
                defaults::DEFAULT_TRAINING_MAX_FEATURES,
            ),
            tree_count: env_parse("SIFT_TREE_COUNT", defaults::DEFAULT_TREE_COUNT),
            max_tree_depth: env_parse("SIFT_MAX_TREE_DEPTH", defaults::DEFAULT_MAX_TREE_DEPTH),
            min_leaf_samples: env_parse(
                "SIFT_MIN_LEAF_SAMPLES",
                defaults::DEFAULT_MIN_LEAF_SAMPLES,
            ),
            test_fraction: env_parse("SIFT_TEST_FRACTION", defaults::DEFAULT_TEST_FRACTION),
            min_eval_samples: env_parse(
                "SIFT_MIN_EVAL_SAMPLES",
                defaults::DEFAULT_MIN_EVAL_SAMPLES,
            ),
            seed: env_parse("SIFT_SEED", defaults::DEFAULT_SEED),
        };

        let evolution = EvolutionConfig {
            min_new_labels_for_retrain: env_parse(
                "SIFT_MIN_NEW_LABELS_FOR_RETRAIN",
                defaults::DEFAULT_MIN_NEW_LABELS_FOR_RETRAIN,
            ),
            schedule_interval_secs: env_parse(
                "SIFT_SCHEDULE_INTERVAL_SECS",
                defaults::DEFAULT_SCHEDULE_INTERVAL_SECS,
            ),
            regression_threshold: env_parse(
                "SIFT_EVOLVE_REGRESSION_THRESHOLD",
                defaults::DEFAULT_REGRESSION_THRESHOLD,
            ),
        };

        let oracle = OracleConfig {
            api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            model: env_string("SIFT_ORACLE_MODEL", defaults::DEFAULT_ORACLE_MODEL),
            max_tokens: env_parse("SIFT_ORACLE_MAX_TOKENS", defaults::DEFAULT_ORACLE_MAX_TOKENS),
            base_url: env_string("SIFT_ORACLE_BASE_URL", defaults::DEFAULT_ORACLE_BASE_URL),
            bootstrap_batch_size: env_parse(
                "SIFT_BOOTSTRAP_BATCH_SIZE",
                defaults::DEFAULT_BOOTSTRAP_BATCH_SIZE,
            ),
        };

        Self {
            data_dir,
            classifier,
            discovery,
            training,
            evolution,
            oracle,
        }
    }

    /// With a different data directory (used by tests and `--data-dir`).
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("sift.db")
    }

    pub fn model_dir(&self) -> PathBuf {
        self.data_dir.join("model")
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) if !raw.is_empty() => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, raw = %raw, "unparseable configuration value, using default");
                default
            }
        },
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SiftConfig::default();
        assert_eq!(config.classifier.margin_threshold, 0.15);
        assert_eq!(config.classifier.confidence_threshold, 0.5);
        assert_eq!(config.classifier.batch_size, 100);
        assert_eq!(config.discovery.min_cluster_size, 20);
        assert_eq!(config.discovery.min_candidates(), 40);
        assert_eq!(config.evolution.min_new_labels_for_retrain, 50);
        assert_eq!(config.evolution.regression_threshold, 0.05);
        assert_eq!(config.training.tree_count, 100);
        assert_eq!(config.training.min_eval_samples, 10);
    }

    #[test]
    fn paths_derive_from_data_dir() {
        let config = SiftConfig::default().with_data_dir("/tmp/sift-test");
        assert_eq!(config.db_path(), PathBuf::from("/tmp/sift-test/sift.db"));
        assert_eq!(config.model_dir(), PathBuf::from("/tmp/sift-test/model"));
    }
}
