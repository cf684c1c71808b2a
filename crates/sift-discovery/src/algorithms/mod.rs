//! Clustering algorithms over sparse TF-IDF vectors.

pub mod dbscan;
pub mod kmeans;

/// Result of a clustering pass: clusters of candidate indices, plus the
/// noise bucket (which discovery discards).
#[derive(Debug, Clone)]
pub struct ClusterResult {
    /// Each inner Vec contains indices into the original candidate slice.
    pub clusters: Vec<Vec<usize>>,
    /// Indices not assigned to any cluster.
    pub noise: Vec<usize>,
}

impl ClusterResult {
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}
