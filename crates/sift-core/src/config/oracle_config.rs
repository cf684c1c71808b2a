use serde::{Deserialize, Serialize};

use super::defaults;

/// Naming / labeling oracle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// API key; when absent, oracle-backed features are disabled.
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
    /// Messages per bootstrap-labeling call.
    pub bootstrap_batch_size: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: defaults::DEFAULT_ORACLE_MODEL.to_string(),
            max_tokens: defaults::DEFAULT_ORACLE_MAX_TOKENS,
            base_url: defaults::DEFAULT_ORACLE_BASE_URL.to_string(),
            bootstrap_batch_size: defaults::DEFAULT_BOOTSTRAP_BATCH_SIZE,
        }
    }
}
