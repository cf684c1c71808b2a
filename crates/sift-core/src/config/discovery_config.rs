use serde::{Deserialize, Serialize};

use super::defaults;

/// Category discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Clusters smaller than this are discarded; discovery itself requires
    /// twice this many candidates before running at all.
    pub min_cluster_size: usize,
    /// Neighborhood radius for density clustering (cosine distance).
    pub eps: f64,
    /// Minimum neighbors (including the point) for a density core point.
    pub min_samples: usize,
    /// Vocabulary cap for the discovery vectorizer.
    pub max_features: usize,
    /// Clusters where one existing category exceeds this fraction of members
    /// are not proposed as novel.
    pub homogeneity_threshold: f64,
    /// Upper bound on k for the partition-clustering fallback.
    pub fallback_max_clusters: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: defaults::DEFAULT_MIN_CLUSTER_SIZE,
            eps: defaults::DEFAULT_DBSCAN_EPS,
            min_samples: defaults::DEFAULT_DBSCAN_MIN_SAMPLES,
            max_features: defaults::DEFAULT_DISCOVERY_MAX_FEATURES,
            homogeneity_threshold: defaults::DEFAULT_HOMOGENEITY_THRESHOLD,
            fallback_max_clusters: defaults::DEFAULT_FALLBACK_MAX_CLUSTERS,
        }
    }
}

impl DiscoveryConfig {
    /// Minimum uncertain candidates before discovery is attempted.
    pub fn min_candidates(&self) -> usize {
        self.min_cluster_size * 2
    }
}
