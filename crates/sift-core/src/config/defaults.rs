//! Default values for every tunable. All overridable from the environment
//! without code changes.

// Classifier
pub const DEFAULT_MARGIN_THRESHOLD: f64 = 0.15;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_BATCH_SIZE: usize = 100;

// Discovery
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 20;
pub const DEFAULT_DBSCAN_EPS: f64 = 0.5;
pub const DEFAULT_DBSCAN_MIN_SAMPLES: usize = 10;
pub const DEFAULT_DISCOVERY_MAX_FEATURES: usize = 3000;
pub const DEFAULT_HOMOGENEITY_THRESHOLD: f64 = 0.8;
pub const DEFAULT_FALLBACK_MAX_CLUSTERS: usize = 5;

// Training
pub const DEFAULT_TRAINING_MAX_FEATURES: usize = 5000;
pub const DEFAULT_TREE_COUNT: usize = 100;
pub const DEFAULT_MAX_TREE_DEPTH: usize = 16;
pub const DEFAULT_MIN_LEAF_SAMPLES: usize = 1;
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
pub const DEFAULT_MIN_EVAL_SAMPLES: usize = 10;
pub const DEFAULT_SEED: u64 = 42;

// Evolution
pub const DEFAULT_MIN_NEW_LABELS_FOR_RETRAIN: usize = 50;
pub const DEFAULT_SCHEDULE_INTERVAL_SECS: u64 = 6 * 60 * 60;
pub const DEFAULT_REGRESSION_THRESHOLD: f64 = 0.05;

// Oracle
pub const DEFAULT_ORACLE_MODEL: &str = "claude-haiku-4-5-20251001";
pub const DEFAULT_ORACLE_MAX_TOKENS: u32 = 500;
pub const DEFAULT_ORACLE_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_BOOTSTRAP_BATCH_SIZE: usize = 10;

// Paths
pub const DEFAULT_DATA_DIR: &str = "data";
