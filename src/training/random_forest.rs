//! Random forest classifier

use super::decision_tree::DecisionTree;
use crate::error::{Result, TriageError};
use ndarray::{Array2, Zip};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Strategy for max features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Square root of n_features
    Sqrt,
    /// Log2 of n_features
    Log2,
    /// Fixed number
    Fixed(usize),
    /// All features
    All,
}

/// Per-class sample weighting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClassWeight {
    /// Every row weighs 1
    Uniform,
    /// n_samples / (n_classes * count(class)), computed on the full training labels
    Balanced,
}

/// Bagged ensemble of Gini trees.
///
/// Probabilities are the mean of the trees' leaf class distributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features drawn per split
    pub max_features: MaxFeatures,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Class weighting
    pub class_weight: ClassWeight,
    /// Base seed; tree `i` uses `seed + i`
    pub random_state: u64,
    n_features: usize,
    n_classes: usize,
    feature_importances: Option<Vec<f64>>,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators: n_estimators.max(1),
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            class_weight: ClassWeight::Uniform,
            random_state: 42,
            n_features: 0,
            n_classes: 0,
            feature_importances: None,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set max features strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    fn compute_max_features(&self, n_features: usize) -> usize {
        match self.max_features {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2().floor() as usize,
            MaxFeatures::Fixed(n) => n.min(n_features),
            MaxFeatures::All => n_features,
        }
        .max(1)
    }

    fn sample_weights(&self, y: &[usize], n_classes: usize) -> Vec<f64> {
        match self.class_weight {
            ClassWeight::Uniform => vec![1.0; y.len()],
            ClassWeight::Balanced => {
                let mut counts = vec![0usize; n_classes];
                for &c in y {
                    counts[c] += 1;
                }
                let n = y.len() as f64;
                let present = counts.iter().filter(|&&c| c > 0).count().max(1) as f64;
                y.iter().map(|&c| n / (present * counts[c] as f64)).collect()
            }
        }
    }

    /// Fit on class indices `y` in `0..n_classes`
    pub fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<&mut Self> {
        let start = Instant::now();
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(TriageError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(TriageError::TrainingError("training set is empty".to_string()));
        }
        if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
            return Err(TriageError::TrainingError(format!(
                "class index {} out of range for {} classes",
                bad, n_classes
            )));
        }

        self.n_features = n_features;
        self.n_classes = n_classes;
        let max_features = self.compute_max_features(n_features);
        let weights = self.sample_weights(y, n_classes);
        let base_seed = self.random_state;

        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let sample_indices: Vec<usize> = if self.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };

                let x_boot = x.select(ndarray::Axis(0), &sample_indices);
                let y_boot: Vec<usize> = sample_indices.iter().map(|&i| y[i]).collect();
                let w_boot: Vec<f64> = sample_indices.iter().map(|&i| weights[i]).collect();

                let mut tree = DecisionTree::new()
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf)
                    .with_max_features(max_features)
                    .with_random_state(rng.gen());
                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }

                tree.fit(&x_boot, &y_boot, &w_boot, n_classes)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;
        self.compute_feature_importances();

        debug!(
            trees = self.trees.len(),
            rows = n_samples,
            features = n_features,
            classes = n_classes,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fitted random forest"
        );
        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        let mut total = vec![0.0; self.n_features];
        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (acc, &val) in total.iter_mut().zip(imp) {
                    *acc += val;
                }
            }
        }

        let n_trees = self.trees.len().max(1) as f64;
        total.iter_mut().for_each(|v| *v /= n_trees);

        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            total.iter_mut().for_each(|v| *v /= sum);
        }
        self.feature_importances = Some(total);
    }

    /// Mean leaf distribution across trees, one row per sample
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(TriageError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(TriageError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let n_trees = self.trees.len() as f64;
        let mut proba = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        Zip::from(proba.rows_mut())
            .and(x.rows())
            .par_for_each(|mut out, row| {
                for tree in &self.trees {
                    if let Ok(dist) = tree.leaf_distribution(row) {
                        for (o, &p) in out.iter_mut().zip(dist) {
                            *o += p;
                        }
                    }
                }
                out.mapv_inplace(|v| v / n_trees);
            });

        Ok(proba)
    }

    /// Index of the most probable class per row; ties go to the lowest index
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.rows().into_iter().map(|row| argmax(row.iter().copied())).collect())
    }

    /// Mean decrease in impurity, normalized to sum to 1
    pub fn feature_importances(&self) -> Option<&[f64]> {
        self.feature_importances.as_deref()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

pub(crate) fn argmax(values: impl Iterator<Item = f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, v) in values.enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn clusters() -> (Array2<f64>, Vec<usize>) {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.1],
            [0.2, 0.2],
            [1.0, 1.0],
            [1.1, 1.1],
            [1.2, 1.2],
        ];
        (x, vec![0, 0, 0, 1, 1, 1])
    }

    #[test]
    fn test_classifier() {
        let (x, y) = clusters();
        let mut rf = RandomForest::new(10).with_random_state(42);
        rf.fit(&x, &y, 2).unwrap();

        let predictions = rf.predict(&x).unwrap();
        let correct = predictions.iter().zip(&y).filter(|(p, a)| p == a).count();
        assert!(correct as f64 / y.len() as f64 >= 0.8);
    }

    #[test]
    fn test_predict_proba_rows_sum_to_one() {
        let (x, y) = clusters();
        let mut rf = RandomForest::new(10)
            .with_class_weight(ClassWeight::Balanced)
            .with_random_state(7);
        rf.fit(&x, &y, 2).unwrap();

        let proba = rf.predict_proba(&x).unwrap();
        assert_eq!(proba.dim(), (6, 2));
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let (x, y) = clusters();
        let mut a = RandomForest::new(8).with_random_state(3);
        let mut b = RandomForest::new(8).with_random_state(3);
        a.fit(&x, &y, 2).unwrap();
        b.fit(&x, &y, 2).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_balanced_weights() {
        let rf = RandomForest::new(1).with_class_weight(ClassWeight::Balanced);
        let weights = rf.sample_weights(&[0, 0, 0, 1], 2);
        assert!((weights[0] - 4.0 / 6.0).abs() < 1e-12);
        assert!((weights[3] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_feature_importances_sum_to_one() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]];
        let y = vec![0, 0, 1, 1];
        let mut rf = RandomForest::new(10)
            .with_max_features(MaxFeatures::All)
            .with_random_state(42);
        rf.fit(&x, &y, 2).unwrap();

        let importances = rf.feature_importances().unwrap();
        assert_eq!(importances.len(), 2);
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[0] >= importances[1]);
    }

    #[test]
    fn test_not_fitted() {
        let rf = RandomForest::new(3);
        assert!(matches!(rf.predict_proba(&array![[1.0]]), Err(TriageError::ModelNotFitted)));
    }
}
