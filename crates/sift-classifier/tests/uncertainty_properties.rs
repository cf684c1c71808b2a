//! Property tests for the uncertainty metrics.

use proptest::prelude::*;
use sift_classifier::UncertaintyScore;

/// Strategy: a normalized probability vector with 1..=10 classes.
fn probability_vector() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.001f64..1.0, 1..=10).prop_map(|raw| {
        let sum: f64 = raw.iter().sum();
        raw.into_iter().map(|v| v / sum).collect()
    })
}

proptest! {
    #[test]
    fn entropy_is_non_negative(p in probability_vector()) {
        let score = UncertaintyScore::from_probabilities(&p);
        prop_assert!(score.entropy >= -1e-9);
    }

    #[test]
    fn entropy_is_maximal_for_uniform(p in probability_vector()) {
        let uniform = vec![1.0 / p.len() as f64; p.len()];
        let score = UncertaintyScore::from_probabilities(&p);
        let uniform_score = UncertaintyScore::from_probabilities(&uniform);
        prop_assert!(score.entropy <= uniform_score.entropy + 1e-9);
    }

    #[test]
    fn margin_and_max_prob_are_bounded(p in probability_vector()) {
        let score = UncertaintyScore::from_probabilities(&p);
        prop_assert!(score.margin >= -1e-12);
        prop_assert!(score.margin <= 1.0 + 1e-12);
        prop_assert!(score.max_prob > 0.0);
        prop_assert!(score.max_prob <= 1.0 + 1e-12);
        prop_assert!(score.margin <= score.max_prob + 1e-12);
    }

    #[test]
    fn flag_matches_the_or_rule(p in probability_vector()) {
        let score = UncertaintyScore::from_probabilities(&p);
        let flagged = score.is_uncertain(0.15, 0.5);
        prop_assert_eq!(flagged, score.margin < 0.15 || score.max_prob < 0.5);
    }
}
