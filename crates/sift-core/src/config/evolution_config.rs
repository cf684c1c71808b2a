use serde::{Deserialize, Serialize};

use super::defaults;

/// Evolution orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Net new labels since the previous version required to retrain.
    pub min_new_labels_for_retrain: usize,
    /// Sleep between scheduled cycles, seconds.
    pub schedule_interval_secs: u64,
    /// Accuracy drop (absolute) past which a regression warning fires.
    pub regression_threshold: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            min_new_labels_for_retrain: defaults::DEFAULT_MIN_NEW_LABELS_FOR_RETRAIN,
            schedule_interval_secs: defaults::DEFAULT_SCHEDULE_INTERVAL_SECS,
            regression_threshold: defaults::DEFAULT_REGRESSION_THRESHOLD,
        }
    }
}
