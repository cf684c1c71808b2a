//! Partition clustering fallback for when density clustering finds no
//! structure. Deterministic farthest-point seeding, cosine assignment,
//! mean-centroid updates.

use sift_text::sparse::{cosine_distance_to_dense, mean_dense, SparseVector};

use super::ClusterResult;

/// Partition clustering parameters.
#[derive(Debug, Clone, Copy)]
pub struct KmeansParams {
    pub k: usize,
    pub max_iterations: usize,
}

/// Cluster vectors into k partitions. `dim` is the vocabulary size the
/// vectors index into. Produces no noise bucket; every point is assigned.
pub fn kmeans(vectors: &[SparseVector], dim: usize, params: &KmeansParams) -> ClusterResult {
    let n = vectors.len();
    if n == 0 || params.k == 0 || params.k > n {
        return ClusterResult {
            clusters: vec![],
            noise: (0..n).collect(),
        };
    }

    let mut centroids = seed_centroids(vectors, dim, params.k);
    let mut assignments = vec![0usize; n];

    for _ in 0..params.max_iterations {
        let mut changed = false;
        for (i, vector) in vectors.iter().enumerate() {
            let nearest = nearest_centroid(vector, &centroids);
            if nearest != assignments[i] {
                assignments[i] = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }
        centroids = recompute_centroids(vectors, &assignments, dim, params.k);
    }

    let mut clusters = vec![Vec::new(); params.k];
    for (i, &assignment) in assignments.iter().enumerate() {
        clusters[assignment].push(i);
    }
    clusters.retain(|c| !c.is_empty());
    clusters.sort_by_key(|c| std::cmp::Reverse(c.len()));

    ClusterResult {
        clusters,
        noise: vec![],
    }
}

/// Farthest-point seeding: first centroid is point 0, each further centroid
/// is the point farthest from all chosen so far. Deterministic, so fallback
/// clustering is reproducible across runs.
fn seed_centroids(vectors: &[SparseVector], dim: usize, k: usize) -> Vec<Vec<f64>> {
    let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);
    centroids.push(mean_dense(&[&vectors[0]], dim));

    while centroids.len() < k {
        let mut best_index = 0;
        let mut best_distance = f64::NEG_INFINITY;
        for (i, vector) in vectors.iter().enumerate() {
            let nearest = centroids
                .iter()
                .map(|c| cosine_distance_to_dense(vector, c))
                .fold(f64::INFINITY, f64::min);
            if nearest > best_distance {
                best_distance = nearest;
                best_index = i;
            }
        }
        centroids.push(mean_dense(&[&vectors[best_index]], dim));
    }
    centroids
}

fn nearest_centroid(vector: &SparseVector, centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let distance = cosine_distance_to_dense(vector, centroid);
        if distance < best_distance {
            best_distance = distance;
            best = i;
        }
    }
    best
}

fn recompute_centroids(
    vectors: &[SparseVector],
    assignments: &[usize],
    dim: usize,
    k: usize,
) -> Vec<Vec<f64>> {
    (0..k)
        .map(|cluster| {
            let members: Vec<&SparseVector> = assignments
                .iter()
                .enumerate()
                .filter(|(_, &a)| a == cluster)
                .map(|(i, _)| &vectors[i])
                .collect();
            if members.is_empty() {
                vec![0.0; dim]
            } else {
                mean_dense(&members, dim)
            }
        })
        .collect()
}
