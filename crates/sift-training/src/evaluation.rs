//! Stratified held-out evaluation: per-category precision/recall/F1 plus
//! overall accuracy and macro-F1.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use sift_core::models::{CategoryMetrics, EvaluationReport};

/// Split sample indices into (train, test) with per-class proportions
/// preserved. Deterministic for a given seed. Classes with a single sample
/// stay entirely in the training partition.
pub fn stratified_split(
    labels: &[usize],
    n_classes: usize,
    test_fraction: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
    for (i, &label) in labels.iter().enumerate() {
        by_class[label].push(i);
    }

    let mut train = Vec::new();
    let mut test = Vec::new();
    for mut members in by_class {
        members.shuffle(&mut rng);
        let n_test = if members.len() < 2 {
            0
        } else {
            ((members.len() as f64 * test_fraction).round() as usize)
                .clamp(1, members.len() - 1)
        };
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }
    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Compute the evaluation report from parallel truth/prediction class-index
/// slices over the held-out partition.
pub fn evaluate(
    categories: &[String],
    truth: &[usize],
    predicted: &[usize],
    train_samples: usize,
) -> EvaluationReport {
    let n_classes = categories.len();
    let mut true_positive = vec![0usize; n_classes];
    let mut predicted_count = vec![0usize; n_classes];
    let mut support = vec![0usize; n_classes];

    let mut correct = 0usize;
    for (&t, &p) in truth.iter().zip(predicted) {
        support[t] += 1;
        predicted_count[p] += 1;
        if t == p {
            true_positive[t] += 1;
            correct += 1;
        }
    }

    let per_category: Vec<CategoryMetrics> = categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let precision = ratio(true_positive[i], predicted_count[i]);
            let recall = ratio(true_positive[i], support[i]);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            CategoryMetrics {
                category: category.clone(),
                precision,
                recall,
                f1,
                support: support[i],
            }
        })
        .collect();

    let accuracy = ratio(correct, truth.len());
    let macro_f1 = if per_category.is_empty() {
        0.0
    } else {
        per_category.iter().map(|m| m.f1).sum::<f64>() / per_category.len() as f64
    };

    EvaluationReport {
        per_category,
        accuracy,
        macro_f1,
        train_samples,
        test_samples: truth.len(),
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_preserves_class_proportions() {
        // 40 samples of class 0, 20 of class 1.
        let labels: Vec<usize> = std::iter::repeat(0)
            .take(40)
            .chain(std::iter::repeat(1).take(20))
            .collect();
        let (train, test) = stratified_split(&labels, 2, 0.2, 42);
        assert_eq!(train.len() + test.len(), 60);

        let test_class_1 = test.iter().filter(|&&i| labels[i] == 1).count();
        assert_eq!(test_class_1, 4);
        assert_eq!(test.len(), 12);
    }

    #[test]
    fn split_is_deterministic_per_seed() {
        let labels: Vec<usize> = (0..50).map(|i| i % 3).collect();
        let a = stratified_split(&labels, 3, 0.2, 7);
        let b = stratified_split(&labels, 3, 0.2, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn singleton_classes_stay_in_training() {
        let labels = vec![0, 0, 0, 0, 1];
        let (train, test) = stratified_split(&labels, 2, 0.2, 42);
        assert!(train.contains(&4));
        assert!(!test.contains(&4));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn split_partitions_every_index_exactly_once(
                labels in prop::collection::vec(0usize..4, 1..80),
                seed in 0u64..1000,
            ) {
                let (train, test) = stratified_split(&labels, 4, 0.2, seed);
                let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
                all.sort_unstable();
                let expected: Vec<usize> = (0..labels.len()).collect();
                prop_assert_eq!(all, expected);
            }
        }
    }

    #[test]
    fn perfect_predictions_score_one() {
        let categories = vec!["a".to_string(), "b".to_string()];
        let truth = vec![0, 1, 0, 1];
        let report = evaluate(&categories, &truth, &truth, 16);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.macro_f1, 1.0);
        assert_eq!(report.test_samples, 4);
        assert!(report.per_category.iter().all(|m| m.f1 == 1.0));
    }

    #[test]
    fn metrics_handle_never_predicted_class() {
        let categories = vec!["a".to_string(), "b".to_string()];
        let truth = vec![0, 1, 1];
        let predicted = vec![0, 0, 0];
        let report = evaluate(&categories, &truth, &predicted, 10);
        let b = &report.per_category[1];
        assert_eq!(b.precision, 0.0);
        assert_eq!(b.recall, 0.0);
        assert_eq!(b.f1, 0.0);
        assert!((report.accuracy - 1.0 / 3.0).abs() < 1e-9);
    }
}
