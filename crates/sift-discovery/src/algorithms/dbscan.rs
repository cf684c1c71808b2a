//! Density-based clustering over a precomputed distance matrix.
//!
//! Auto-determines the number of clusters and isolates outliers into the
//! noise bucket. Points within `eps` of a core point join its cluster; a
//! core point has at least `min_samples` neighbors (itself included).

use std::collections::VecDeque;

use super::ClusterResult;

/// Density clustering parameters.
#[derive(Debug, Clone, Copy)]
pub struct DbscanParams {
    /// Neighborhood radius (inclusive).
    pub eps: f64,
    /// Minimum neighborhood size (the point itself counts) for a core point.
    pub min_samples: usize,
}

const UNVISITED: i32 = -2;
const NOISE: i32 = -1;

/// Run DBSCAN over a symmetric pairwise distance matrix. Returns clusters of
/// point indices plus the noise bucket.
pub fn dbscan(distances: &[Vec<f64>], params: &DbscanParams) -> ClusterResult {
    let n = distances.len();
    let mut labels = vec![UNVISITED; n];
    let mut next_cluster = 0i32;

    for point in 0..n {
        if labels[point] != UNVISITED {
            continue;
        }

        let neighbors = region_query(distances, point, params.eps);
        if neighbors.len() < params.min_samples {
            labels[point] = NOISE;
            continue;
        }

        // Grow a new cluster from this core point.
        let cluster = next_cluster;
        next_cluster += 1;
        labels[point] = cluster;

        let mut frontier: VecDeque<usize> = neighbors.into();
        while let Some(candidate) = frontier.pop_front() {
            if labels[candidate] == NOISE {
                // Border point reached from a core point.
                labels[candidate] = cluster;
            }
            if labels[candidate] != UNVISITED {
                continue;
            }
            labels[candidate] = cluster;

            let candidate_neighbors = region_query(distances, candidate, params.eps);
            if candidate_neighbors.len() >= params.min_samples {
                frontier.extend(candidate_neighbors);
            }
        }
    }

    let mut clusters = vec![Vec::new(); next_cluster as usize];
    let mut noise = Vec::new();
    for (point, &label) in labels.iter().enumerate() {
        if label < 0 {
            noise.push(point);
        } else {
            clusters[label as usize].push(point);
        }
    }
    clusters.sort_by_key(|c| std::cmp::Reverse(c.len()));

    ClusterResult { clusters, noise }
}

/// Indices within `eps` of `point`, the point itself included.
fn region_query(distances: &[Vec<f64>], point: usize, eps: f64) -> Vec<usize> {
    distances[point]
        .iter()
        .enumerate()
        .filter(|(_, &d)| d <= eps)
        .map(|(i, _)| i)
        .collect()
}
