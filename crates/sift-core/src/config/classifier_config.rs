use serde::{Deserialize, Serialize};

use super::defaults;

/// Uncertainty-aware classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Flag a prediction when the top-2 probability gap falls below this.
    pub margin_threshold: f64,
    /// Flag a prediction when the top probability falls below this.
    pub confidence_threshold: f64,
    /// Messages classified per batch.
    pub batch_size: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            margin_threshold: defaults::DEFAULT_MARGIN_THRESHOLD,
            confidence_threshold: defaults::DEFAULT_CONFIDENCE_THRESHOLD,
            batch_size: defaults::DEFAULT_BATCH_SIZE,
        }
    }
}
