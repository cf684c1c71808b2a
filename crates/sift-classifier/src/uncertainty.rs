//! Uncertainty metrics over a prediction's probability vector.

use sift_core::constants::PROBABILITY_EPSILON;

/// How unsure the model is about one prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UncertaintyScore {
    /// Spread of the prediction: `-Σ p·ln(p)`.
    pub entropy: f64,
    /// Gap between the top-2 probabilities; 1.0 when only one class exists.
    pub margin: f64,
    /// Highest class probability (the confidence score).
    pub max_prob: f64,
}

impl UncertaintyScore {
    /// Compute the metrics for one probability vector.
    pub fn from_probabilities(probabilities: &[f64]) -> Self {
        if probabilities.is_empty() {
            return Self {
                entropy: 0.0,
                margin: 1.0,
                max_prob: 0.0,
            };
        }

        let entropy = -probabilities
            .iter()
            .map(|p| p * (p + PROBABILITY_EPSILON).ln())
            .sum::<f64>();

        let mut sorted = probabilities.to_vec();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        let max_prob = sorted[0];
        let margin = if sorted.len() > 1 {
            sorted[0] - sorted[1]
        } else {
            1.0
        };

        Self {
            entropy,
            margin,
            max_prob,
        }
    }

    /// The uncertainty flag: a close call between the top categories OR low
    /// absolute confidence independently justifies flagging. Both
    /// comparisons are strict, so boundary values are not flagged.
    pub fn is_uncertain(&self, margin_threshold: f64, confidence_threshold: f64) -> bool {
        self.margin < margin_threshold || self.max_prob < confidence_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_class_margin_is_exactly_one() {
        let score = UncertaintyScore::from_probabilities(&[1.0]);
        assert_eq!(score.margin, 1.0);
        assert_eq!(score.max_prob, 1.0);
    }

    #[test]
    fn two_class_margin_is_top_gap() {
        let score = UncertaintyScore::from_probabilities(&[0.6, 0.4]);
        assert!((score.margin - 0.2).abs() < 1e-9);
        assert!((score.max_prob - 0.6).abs() < 1e-12);
    }

    #[test]
    fn uniform_vector_maximizes_entropy() {
        let uniform = UncertaintyScore::from_probabilities(&[0.25; 4]);
        let skewed = UncertaintyScore::from_probabilities(&[0.7, 0.1, 0.1, 0.1]);
        assert!(uniform.entropy > skewed.entropy);
    }

    #[test]
    fn flag_uses_strict_inequalities() {
        // Exactly at both thresholds: not flagged.
        let boundary = UncertaintyScore {
            entropy: 0.0,
            margin: 0.15,
            max_prob: 0.5,
        };
        assert!(!boundary.is_uncertain(0.15, 0.5));

        // Just below the margin threshold: flagged.
        let close_call = UncertaintyScore {
            entropy: 0.0,
            margin: 0.149,
            max_prob: 0.9,
        };
        assert!(close_call.is_uncertain(0.15, 0.5));

        // Just below the confidence threshold: flagged.
        let low_confidence = UncertaintyScore {
            entropy: 0.0,
            margin: 0.3,
            max_prob: 0.499,
        };
        assert!(low_confidence.is_uncertain(0.15, 0.5));
    }

    #[test]
    fn mixed_batch_flags_only_the_unsure_items() {
        // A(0.9), B(0.4 vs 0.38 runner-up), C(0.3 max).
        let confident = UncertaintyScore::from_probabilities(&[0.9, 0.06, 0.04]);
        let torn = UncertaintyScore::from_probabilities(&[0.4, 0.38, 0.22]);
        let diffuse = UncertaintyScore::from_probabilities(&[0.3, 0.25, 0.25, 0.2]);

        assert!(!confident.is_uncertain(0.15, 0.5));
        assert!(torn.is_uncertain(0.15, 0.5));
        assert!(diffuse.is_uncertain(0.15, 0.5));
    }
}
