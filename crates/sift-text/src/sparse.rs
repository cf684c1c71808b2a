//! Sparse vectors over the vectorizer vocabulary, with the cosine geometry
//! used by clustering and centroid computation.

use serde::{Deserialize, Serialize};

/// A sparse vector of (feature index, weight) entries, sorted by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector(pub Vec<(usize, f64)>);

impl SparseVector {
    pub fn new(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_by_key(|&(i, _)| i);
        Self(entries)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Weight at a feature index, 0.0 if absent.
    pub fn value_at(&self, index: usize) -> f64 {
        match self.0.binary_search_by_key(&index, |&(i, _)| i) {
            Ok(pos) => self.0[pos].1,
            Err(_) => 0.0,
        }
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let mut sum = 0.0;
        let (mut a, mut b) = (0, 0);
        while a < self.0.len() && b < other.0.len() {
            match self.0[a].0.cmp(&other.0[b].0) {
                std::cmp::Ordering::Less => a += 1,
                std::cmp::Ordering::Greater => b += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.0[a].1 * other.0[b].1;
                    a += 1;
                    b += 1;
                }
            }
        }
        sum
    }

    pub fn dot_dense(&self, dense: &[f64]) -> f64 {
        self.0
            .iter()
            .filter(|(i, _)| *i < dense.len())
            .map(|(i, v)| v * dense[*i])
            .sum()
    }

    pub fn norm(&self) -> f64 {
        self.0.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
    }

    /// Scale to unit length. Zero vectors are left unchanged.
    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for entry in &mut self.0 {
                entry.1 /= norm;
            }
        }
    }
}

/// Cosine distance in [0, 2]. Distance to or from a zero vector is 1.0.
pub fn cosine_distance(a: &SparseVector, b: &SparseVector) -> f64 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 1.0;
    }
    1.0 - a.dot(b) / denom
}

/// Cosine distance between a sparse vector and a dense centroid.
pub fn cosine_distance_to_dense(a: &SparseVector, centroid: &[f64]) -> f64 {
    let centroid_norm = centroid.iter().map(|v| v * v).sum::<f64>().sqrt();
    let denom = a.norm() * centroid_norm;
    if denom == 0.0 {
        return 1.0;
    }
    1.0 - a.dot_dense(centroid) / denom
}

/// Mean of the given sparse vectors as a dense vector of length `dim`.
pub fn mean_dense(vectors: &[&SparseVector], dim: usize) -> Vec<f64> {
    let mut mean = vec![0.0; dim];
    if vectors.is_empty() {
        return mean;
    }
    for vector in vectors {
        for &(index, value) in &vector.0 {
            if index < dim {
                mean[index] += value;
            }
        }
    }
    let n = vectors.len() as f64;
    for value in &mut mean {
        *value /= n;
    }
    mean
}

/// Full pairwise cosine-distance matrix.
pub fn pairwise_cosine_distances(vectors: &[SparseVector]) -> Vec<Vec<f64>> {
    let n = vectors.len();
    let norms: Vec<f64> = vectors.iter().map(|v| v.norm()).collect();
    let mut distances = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let denom = norms[i] * norms[j];
            let d = if denom == 0.0 {
                1.0
            } else {
                1.0 - vectors[i].dot(&vectors[j]) / denom
            };
            distances[i][j] = d;
            distances[j][i] = d;
        }
    }
    distances
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_matches_shared_indices_only() {
        let a = SparseVector::new(vec![(0, 1.0), (2, 2.0), (5, 3.0)]);
        let b = SparseVector::new(vec![(2, 4.0), (3, 1.0), (5, 0.5)]);
        assert!((a.dot(&b) - (2.0 * 4.0 + 3.0 * 0.5)).abs() < 1e-12);
    }

    #[test]
    fn identical_vectors_have_zero_distance() {
        let a = SparseVector::new(vec![(0, 0.3), (1, 0.7)]);
        assert!(cosine_distance(&a, &a).abs() < 1e-12);
    }

    #[test]
    fn orthogonal_vectors_have_unit_distance() {
        let a = SparseVector::new(vec![(0, 1.0)]);
        let b = SparseVector::new(vec![(1, 1.0)]);
        assert!((cosine_distance(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_vector_distance_is_one() {
        let a = SparseVector::new(vec![]);
        let b = SparseVector::new(vec![(0, 1.0)]);
        assert_eq!(cosine_distance(&a, &b), 1.0);
    }

    #[test]
    fn normalization_produces_unit_norm() {
        let mut a = SparseVector::new(vec![(0, 3.0), (1, 4.0)]);
        a.l2_normalize();
        assert!((a.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mean_dense_averages_entries() {
        let a = SparseVector::new(vec![(0, 2.0)]);
        let b = SparseVector::new(vec![(0, 4.0), (1, 6.0)]);
        let mean = mean_dense(&[&a, &b], 2);
        assert_eq!(mean, vec![3.0, 3.0]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn sparse_vector() -> impl Strategy<Value = SparseVector> {
            prop::collection::btree_map(0usize..50, 0.01f64..10.0, 0..20)
                .prop_map(|entries| SparseVector::new(entries.into_iter().collect()))
        }

        proptest! {
            #[test]
            fn cosine_distance_is_symmetric_and_bounded(
                a in sparse_vector(),
                b in sparse_vector(),
            ) {
                let ab = cosine_distance(&a, &b);
                let ba = cosine_distance(&b, &a);
                prop_assert!((ab - ba).abs() < 1e-12);
                prop_assert!(ab >= -1e-12);
                prop_assert!(ab <= 2.0 + 1e-12);
            }

            #[test]
            fn normalized_vectors_have_unit_or_zero_norm(mut v in sparse_vector()) {
                v.l2_normalize();
                let norm = v.norm();
                prop_assert!(norm == 0.0 || (norm - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn pairwise_matrix_is_symmetric_with_zero_diagonal() {
        let vectors = vec![
            SparseVector::new(vec![(0, 1.0)]),
            SparseVector::new(vec![(0, 1.0), (1, 1.0)]),
            SparseVector::new(vec![(1, 1.0)]),
        ];
        let distances = pairwise_cosine_distances(&vectors);
        for i in 0..3 {
            assert_eq!(distances[i][i], 0.0);
            for j in 0..3 {
                assert!((distances[i][j] - distances[j][i]).abs() < 1e-12);
            }
        }
        assert!((distances[0][2] - 1.0).abs() < 1e-12);
    }
}
