//! Decision tree classifier

use crate::error::{Result, TriageError};
use ndarray::{Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node holding the weighted class distribution of its samples
    Leaf {
        distribution: Vec<f64>,
        n_samples: usize,
    },
    /// Internal node; samples with `x[feature_idx] <= threshold` go left
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Gini decision tree over integer class indices with per-sample weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features drawn per split (all when None)
    pub max_features: Option<usize>,
    /// Seed for the per-split feature draw
    pub random_state: u64,
    n_features: usize,
    n_classes: usize,
    feature_importances: Option<Vec<f64>>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only inputs shared by every recursive build step
struct BuildContext<'a> {
    x: &'a Array2<f64>,
    y: &'a [usize],
    weights: &'a [f64],
}

struct BestSplit {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_state: 0,
            n_features: 0,
            n_classes: 0,
            feature_importances: None,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Set the number of features drawn per split
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features.max(1));
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Fit on class indices `y` in `0..n_classes`, weighting each row by `weights`
    pub fn fit(
        &mut self,
        x: &Array2<f64>,
        y: &[usize],
        weights: &[f64],
        n_classes: usize,
    ) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples != y.len() || n_samples != weights.len() {
            return Err(TriageError::ShapeError {
                expected: format!("{} labels and weights", n_samples),
                actual: format!("{} labels, {} weights", y.len(), weights.len()),
            });
        }
        if n_samples == 0 {
            return Err(TriageError::TrainingError("cannot fit a tree on zero rows".to_string()));
        }
        if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
            return Err(TriageError::TrainingError(format!(
                "class index {} out of range for {} classes",
                bad, n_classes
            )));
        }

        self.n_features = x.ncols();
        self.n_classes = n_classes;

        let ctx = BuildContext { x, y, weights };
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        let mut importances = vec![0.0; self.n_features];
        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(&ctx, &indices, 0, &mut importances, &mut rng));

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|imp| *imp /= total);
        }
        self.feature_importances = Some(importances);

        Ok(self)
    }

    fn class_weights(&self, ctx: &BuildContext, indices: &[usize]) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_classes];
        for &i in indices {
            totals[ctx.y[i]] += ctx.weights[i];
        }
        totals
    }

    fn build_tree(
        &self,
        ctx: &BuildContext,
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let totals = self.class_weights(ctx, indices);
        let node_weight: f64 = totals.iter().sum();
        let impurity = gini(&totals, node_weight);

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || impurity <= 1e-12;

        if should_stop {
            return leaf(totals, node_weight, n_samples);
        }

        let Some(best) = self.find_best_split(ctx, indices, &totals, node_weight, impurity, rng) else {
            return leaf(totals, node_weight, n_samples);
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| ctx.x[[i, best.feature_idx]] <= best.threshold);

        if left_indices.len() < self.min_samples_leaf || right_indices.len() < self.min_samples_leaf {
            return leaf(totals, node_weight, n_samples);
        }

        importances[best.feature_idx] += node_weight * best.gain;

        let left = Box::new(self.build_tree(ctx, &left_indices, depth + 1, importances, rng));
        let right = Box::new(self.build_tree(ctx, &right_indices, depth + 1, importances, rng));

        TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left,
            right,
            n_samples,
            impurity,
        }
    }

    /// Scan features in random order, stopping once `max_features` have been
    /// examined and a valid split exists.
    fn find_best_split(
        &self,
        ctx: &BuildContext,
        indices: &[usize],
        totals: &[f64],
        node_weight: f64,
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<BestSplit> {
        let max_features = self.max_features.unwrap_or(self.n_features).min(self.n_features);
        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(rng);

        let mut best: Option<BestSplit> = None;
        let mut sorted: Vec<(f64, usize, f64)> = Vec::with_capacity(indices.len());

        for (visited, &feature_idx) in features.iter().enumerate() {
            if visited >= max_features && best.is_some() {
                break;
            }

            sorted.clear();
            sorted.extend(
                indices
                    .iter()
                    .map(|&i| (ctx.x[[i, feature_idx]], ctx.y[i], ctx.weights[i])),
            );
            sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let n = sorted.len();
            let mut left = vec![0.0; self.n_classes];
            let mut left_weight = 0.0;

            for pos in 0..n - 1 {
                let (value, class, weight) = sorted[pos];
                left[class] += weight;
                left_weight += weight;

                let next_value = sorted[pos + 1].0;
                if next_value <= value + 1e-12 {
                    continue;
                }
                let left_count = pos + 1;
                if left_count < self.min_samples_leaf || n - left_count < self.min_samples_leaf {
                    continue;
                }

                let right_weight = node_weight - left_weight;
                if left_weight <= 0.0 || right_weight <= 0.0 {
                    continue;
                }
                let right: Vec<f64> = totals.iter().zip(&left).map(|(t, l)| t - l).collect();
                let child = (left_weight * gini(&left, left_weight)
                    + right_weight * gini(&right, right_weight))
                    / node_weight;
                let gain = parent_impurity - child;

                if best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(BestSplit {
                        feature_idx,
                        threshold: (value + next_value) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }

    /// Class distribution of the leaf reached by `sample`
    pub fn leaf_distribution(&self, sample: ArrayView1<f64>) -> Result<&[f64]> {
        let mut node = self.root.as_ref().ok_or(TriageError::ModelNotFitted)?;
        loop {
            match node {
                TreeNode::Leaf { distribution, .. } => return Ok(distribution),
                TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                    node = if sample[*feature_idx] <= *threshold { &**left } else { &**right };
                }
            }
        }
    }

    /// Class probabilities for every row of `x`
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features {
            return Err(TriageError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        let mut proba = Array2::zeros((x.nrows(), self.n_classes));
        for (i, row) in x.rows().into_iter().enumerate() {
            let dist = self.leaf_distribution(row)?;
            for (j, &p) in dist.iter().enumerate() {
                proba[[i, j]] = p;
            }
        }
        Ok(proba)
    }

    /// Normalized impurity decrease per feature
    pub fn feature_importances(&self) -> Option<&[f64]> {
        self.feature_importances.as_deref()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Get tree depth
    pub fn get_depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        self.root.as_ref().map_or(0, depth)
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        fn count(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => count(left) + count(right),
            }
        }
        self.root.as_ref().map_or(0, count)
    }
}

fn gini(totals: &[f64], weight: f64) -> f64 {
    if weight <= 0.0 {
        return 0.0;
    }
    1.0 - totals.iter().map(|&t| (t / weight).powi(2)).sum::<f64>()
}

fn leaf(totals: Vec<f64>, weight: f64, n_samples: usize) -> TreeNode {
    let distribution = if weight > 0.0 {
        totals.iter().map(|t| t / weight).collect()
    } else {
        let k = totals.len().max(1) as f64;
        vec![1.0 / k; totals.len()]
    };
    TreeNode::Leaf { distribution, n_samples }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ones(n: usize) -> Vec<f64> {
        vec![1.0; n]
    }

    #[test]
    fn test_separable_classes() {
        let x = array![[0.0, 5.0], [0.1, 3.0], [1.0, 4.0], [1.1, 2.0]];
        let y = [0, 0, 1, 1];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y, &ones(4), 2).unwrap();

        let proba = tree.predict_proba(&x).unwrap();
        assert_eq!(proba[[0, 0]], 1.0);
        assert_eq!(proba[[3, 1]], 1.0);
        assert_eq!(tree.get_depth(), 1);
    }

    #[test]
    fn test_xor_needs_zero_gain_split() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = [0, 1, 1, 0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y, &ones(4), 2).unwrap();

        let proba = tree.predict_proba(&x).unwrap();
        for (i, &class) in y.iter().enumerate() {
            assert_eq!(proba[[i, class]], 1.0);
        }
    }

    #[test]
    fn test_max_depth_gives_mixed_leaves() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = [0, 1, 0, 1];

        let mut tree = DecisionTree::new().with_max_depth(0);
        tree.fit(&x, &y, &ones(4), 2).unwrap();

        let proba = tree.predict_proba(&x).unwrap();
        assert!((proba[[0, 0]] - 0.5).abs() < 1e-12);
        assert_eq!(tree.get_n_leaves(), 1);
    }

    #[test]
    fn test_sample_weights_shift_distribution() {
        let x = array![[1.0], [1.0], [1.0]];
        let y = [0, 0, 1];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y, &[1.0, 1.0, 2.0], 2).unwrap();

        let proba = tree.predict_proba(&x).unwrap();
        assert!((proba[[0, 0]] - 0.5).abs() < 1e-12);
        assert!((proba[[0, 1]] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_feature_importances() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]];
        let y = [0, 0, 1, 1];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y, &ones(4), 2).unwrap();

        let importances = tree.feature_importances().unwrap();
        assert!((importances[0] - 1.0).abs() < 1e-12);
        assert_eq!(importances[1], 0.0);
    }

    #[test]
    fn test_not_fitted() {
        let tree = DecisionTree::new();
        let x = array![[1.0]];
        assert!(tree.predict_proba(&x).is_err());
    }
}
