//! Seeded random-forest ensemble over sparse TF-IDF vectors.
//!
//! Gini-impurity CART trees with bootstrap sampling and sqrt-feature
//! subsampling. Probabilities are the average of per-tree leaf class
//! distributions, so the ensemble yields the smooth probability vectors the
//! uncertainty metrics need.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use sift_text::SparseVector;

/// Forest hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    pub tree_count: usize,
    pub max_depth: usize,
    pub min_leaf_samples: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    /// Class distribution at a leaf, normalized to sum to 1.
    Leaf { distribution: Vec<f64> },
    /// Binary split: `value <= threshold` goes left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn leaf_distribution<'a>(&'a self, sample: &SparseVector) -> &'a [f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if sample.value_at(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// The trained ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_classes: usize,
}

impl RandomForest {
    /// Fit the forest. `samples` and `labels` are parallel; labels are class
    /// indices in `0..n_classes`.
    pub fn fit(
        samples: &[SparseVector],
        labels: &[usize],
        n_classes: usize,
        n_features: usize,
        config: &ForestConfig,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let n = samples.len();
        let feature_sample = (n_features as f64).sqrt().ceil().max(1.0) as usize;

        let trees = (0..config.tree_count)
            .map(|_| {
                // Bootstrap sample with replacement.
                let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let mut builder = TreeBuilder {
                    samples,
                    labels,
                    n_classes,
                    n_features,
                    feature_sample,
                    max_depth: config.max_depth,
                    min_leaf_samples: config.min_leaf_samples,
                    nodes: Vec::new(),
                };
                builder.build(indices, 0, &mut rng);
                DecisionTree {
                    nodes: builder.nodes,
                }
            })
            .collect();

        Self { trees, n_classes }
    }

    /// Average leaf distribution across all trees.
    pub fn predict_proba(&self, sample: &SparseVector) -> Vec<f64> {
        let mut probabilities = vec![0.0; self.n_classes];
        if self.trees.is_empty() {
            return probabilities;
        }
        for tree in &self.trees {
            for (p, leaf) in probabilities.iter_mut().zip(tree.leaf_distribution(sample)) {
                *p += leaf;
            }
        }
        let count = self.trees.len() as f64;
        for p in &mut probabilities {
            *p /= count;
        }
        probabilities
    }

    /// Index of the most probable class.
    pub fn predict(&self, sample: &SparseVector) -> usize {
        let probabilities = self.predict_proba(sample);
        probabilities
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

struct TreeBuilder<'a> {
    samples: &'a [SparseVector],
    labels: &'a [usize],
    n_classes: usize,
    n_features: usize,
    feature_sample: usize,
    max_depth: usize,
    min_leaf_samples: usize,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    /// Recursively grow a subtree over `indices`; returns the node index.
    fn build(&mut self, indices: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let counts = self.class_counts(&indices);
        let is_pure = counts.iter().filter(|&&c| c > 0.0).count() <= 1;

        if is_pure || depth >= self.max_depth || indices.len() < 2 * self.min_leaf_samples {
            return self.push_leaf(counts);
        }

        match self.best_split(&indices, rng) {
            Some((feature, threshold, left_idx, right_idx)) => {
                let node = self.nodes.len();
                // Placeholder, patched after children are built.
                self.nodes.push(Node::Leaf {
                    distribution: vec![],
                });
                let left = self.build(left_idx, depth + 1, rng);
                let right = self.build(right_idx, depth + 1, rng);
                self.nodes[node] = Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                };
                node
            }
            None => self.push_leaf(counts),
        }
    }

    fn push_leaf(&mut self, counts: Vec<f64>) -> usize {
        let total: f64 = counts.iter().sum();
        let distribution = if total > 0.0 {
            counts.iter().map(|c| c / total).collect()
        } else {
            vec![1.0 / self.n_classes as f64; self.n_classes]
        };
        self.nodes.push(Node::Leaf { distribution });
        self.nodes.len() - 1
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_classes];
        for &i in indices {
            counts[self.labels[i]] += 1.0;
        }
        counts
    }

    /// Best gini split over a random feature subsample.
    /// Returns (feature, threshold, left indices, right indices).
    fn best_split(
        &self,
        indices: &[usize],
        rng: &mut StdRng,
    ) -> Option<(usize, f64, Vec<usize>, Vec<usize>)> {
        if self.n_features == 0 {
            return None;
        }
        let mut best: Option<(f64, usize, f64)> = None;

        for _ in 0..self.feature_sample {
            let feature = rng.gen_range(0..self.n_features);

            let mut values: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (self.samples[i].value_at(feature), self.labels[i]))
                .collect();
            values.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            if values[0].0 == values[values.len() - 1].0 {
                continue;
            }

            // Incremental left/right class counts across sorted values.
            let mut left_counts = vec![0.0f64; self.n_classes];
            let mut right_counts = self.class_counts(indices);
            let total = indices.len() as f64;

            for i in 0..values.len() - 1 {
                left_counts[values[i].1] += 1.0;
                right_counts[values[i].1] -= 1.0;

                if values[i + 1].0 <= values[i].0 {
                    continue;
                }

                let n_left = (i + 1) as f64;
                let n_right = total - n_left;
                if (n_left as usize) < self.min_leaf_samples
                    || (n_right as usize) < self.min_leaf_samples
                {
                    continue;
                }

                let impurity = (n_left / total) * gini(&left_counts, n_left)
                    + (n_right / total) * gini(&right_counts, n_right);
                let threshold = (values[i].0 + values[i + 1].0) / 2.0;

                if best.map_or(true, |(best_impurity, _, _)| impurity < best_impurity) {
                    best = Some((impurity, feature, threshold));
                }
            }
        }

        let (_, feature, threshold) = best?;
        let (mut left, mut right) = (Vec::new(), Vec::new());
        for &i in indices {
            if self.samples[i].value_at(feature) <= threshold {
                left.push(i);
            } else {
                right.push(i);
            }
        }
        if left.is_empty() || right.is_empty() {
            return None;
        }
        Some((feature, threshold, left, right))
    }
}

fn gini(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let sum_sq: f64 = counts.iter().map(|c| (c / total) * (c / total)).sum();
    1.0 - sum_sq
}
