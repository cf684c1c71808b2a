//! Cluster profiling: descriptive top terms, representative samples, and the
//! current-label distribution used by the homogeneity filter.

use std::collections::HashMap;

use sift_core::constants::{REPRESENTATIVE_SAMPLES, TOP_TERMS_PER_CLUSTER};
use sift_text::sparse::{cosine_distance_to_dense, mean_dense, SparseVector};

/// Ephemeral description of one discovered cluster. Never persisted; the
/// surviving parts are folded into a category proposal.
#[derive(Debug, Clone)]
pub struct ClusterProfile {
    /// Indices into the candidate slice.
    pub members: Vec<usize>,
    pub size: usize,
    /// Top TF-IDF terms by mean cluster weight, descending.
    pub top_terms: Vec<String>,
    /// Message ids of the members nearest the cluster centroid.
    pub sample_ids: Vec<i64>,
    /// (category, count) of the members' current labels, largest first.
    pub label_distribution: Vec<(String, usize)>,
}

impl ClusterProfile {
    /// Fraction of members held by the dominant existing category.
    pub fn dominant_fraction(&self) -> f64 {
        if self.size == 0 {
            return 0.0;
        }
        self.label_distribution
            .first()
            .map(|(_, count)| *count as f64 / self.size as f64)
            .unwrap_or(0.0)
    }
}

/// Build the profile for one cluster.
///
/// `vectors`, `message_ids`, and `current_labels` are parallel to the
/// candidate slice the member indices point into.
pub fn build_profile(
    members: &[usize],
    vectors: &[SparseVector],
    vocabulary: &[String],
    message_ids: &[i64],
    current_labels: &[Option<String>],
) -> ClusterProfile {
    let member_vectors: Vec<&SparseVector> = members.iter().map(|&i| &vectors[i]).collect();
    let centroid = mean_dense(&member_vectors, vocabulary.len());

    // Top terms by mean weight.
    let mut weighted: Vec<(usize, f64)> = centroid
        .iter()
        .enumerate()
        .filter(|(_, &w)| w > 0.0)
        .map(|(i, &w)| (i, w))
        .collect();
    weighted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let top_terms = weighted
        .iter()
        .take(TOP_TERMS_PER_CLUSTER)
        .map(|&(i, _)| vocabulary[i].clone())
        .collect();

    // Members nearest the centroid, as representative samples.
    let mut by_distance: Vec<(usize, f64)> = members
        .iter()
        .map(|&i| (i, cosine_distance_to_dense(&vectors[i], &centroid)))
        .collect();
    by_distance.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    let sample_ids = by_distance
        .iter()
        .take(REPRESENTATIVE_SAMPLES)
        .map(|&(i, _)| message_ids[i])
        .collect();

    // Current-label distribution.
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for &i in members {
        if let Some(category) = &current_labels[i] {
            *counts.entry(category.as_str()).or_insert(0) += 1;
        }
    }
    let mut label_distribution: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(category, count)| (category.to_string(), count))
        .collect();
    label_distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    ClusterProfile {
        members: members.to_vec(),
        size: members.len(),
        top_terms,
        sample_ids,
        label_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with_distribution(size: usize, distribution: Vec<(String, usize)>) -> ClusterProfile {
        ClusterProfile {
            members: (0..size).collect(),
            size,
            top_terms: vec![],
            sample_ids: vec![],
            label_distribution: distribution,
        }
    }

    #[test]
    fn dominant_fraction_uses_largest_category() {
        let profile = profile_with_distribution(
            20,
            vec![("travel".to_string(), 17), ("personal".to_string(), 3)],
        );
        assert!((profile.dominant_fraction() - 0.85).abs() < 1e-9);
    }

    #[test]
    fn dominant_fraction_of_unlabeled_cluster_is_zero() {
        let profile = profile_with_distribution(10, vec![]);
        assert_eq!(profile.dominant_fraction(), 0.0);
    }

    #[test]
    fn build_profile_extracts_terms_samples_and_distribution() {
        let vocabulary: Vec<String> = ["alpha", "beta", "gamma"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let vectors = vec![
            SparseVector::new(vec![(0, 0.9), (1, 0.1)]),
            SparseVector::new(vec![(0, 0.8), (2, 0.2)]),
            SparseVector::new(vec![(0, 0.85)]),
        ];
        let message_ids = vec![11, 22, 33];
        let labels = vec![
            Some("travel".to_string()),
            Some("travel".to_string()),
            Some("personal".to_string()),
        ];

        let profile = build_profile(&[0, 1, 2], &vectors, &vocabulary, &message_ids, &labels);
        assert_eq!(profile.size, 3);
        assert_eq!(profile.top_terms[0], "alpha");
        assert_eq!(profile.sample_ids.len(), 3);
        assert_eq!(profile.label_distribution[0], ("travel".to_string(), 2));
        assert!((profile.dominant_fraction() - 2.0 / 3.0).abs() < 1e-9);
    }
}
