//! Permutation-sampling Shapley values

use crate::error::{Result, TriageError};
use ndarray::{Array2, ArrayView1, Axis};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Monte Carlo Shapley estimator for a class-probability function.
///
/// Each permutation walks a random background row towards the explained row
/// one feature at a time; the probability change at each step is credited to
/// the feature that was switched. All coalitions of one permutation go
/// through the model in a single batch.
pub struct ShapleySampler<'a> {
    background: &'a Array2<f64>,
    n_permutations: usize,
    seed: u64,
}

impl<'a> ShapleySampler<'a> {
    pub fn new(background: &'a Array2<f64>) -> Self {
        Self {
            background,
            n_permutations: 10,
            seed: 42,
        }
    }

    /// Set number of permutations per explained row
    pub fn with_n_permutations(mut self, n: usize) -> Self {
        self.n_permutations = n.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Attribution magnitudes, one row per explained row.
    ///
    /// Each entry is the absolute Shapley value of that feature averaged
    /// over classes.
    pub fn explain<F>(&self, predict_proba: F, rows: &Array2<f64>) -> Result<Array2<f64>>
    where
        F: Fn(&Array2<f64>) -> Result<Array2<f64>> + Sync,
    {
        if self.background.nrows() == 0 {
            return Err(TriageError::ExplanationError("background is empty".to_string()));
        }
        if self.background.ncols() != rows.ncols() {
            return Err(TriageError::ShapeError {
                expected: format!("{} features", self.background.ncols()),
                actual: format!("{} features", rows.ncols()),
            });
        }

        let per_row: Vec<Vec<f64>> = rows
            .axis_iter(Axis(0))
            .into_par_iter()
            .enumerate()
            .map(|(idx, row)| self.explain_row(&predict_proba, row, idx as u64))
            .collect::<Result<_>>()?;

        let n_features = rows.ncols();
        let flat: Vec<f64> = per_row.into_iter().flatten().collect();
        Ok(Array2::from_shape_vec((rows.nrows(), n_features), flat)?)
    }

    fn explain_row<F>(&self, predict_proba: &F, instance: ArrayView1<f64>, idx: u64) -> Result<Vec<f64>>
    where
        F: Fn(&Array2<f64>) -> Result<Array2<f64>>,
    {
        let n_features = instance.len();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(idx));
        let mut phi: Option<Array2<f64>> = None;
        let mut order: Vec<usize> = (0..n_features).collect();

        for _ in 0..self.n_permutations {
            order.shuffle(&mut rng);
            let base = self.background.row(rng.gen_range(0..self.background.nrows()));

            let mut coalitions = Array2::zeros((n_features + 1, n_features));
            let mut current = base.to_owned();
            coalitions.row_mut(0).assign(&current);
            for (step, &feature) in order.iter().enumerate() {
                current[feature] = instance[feature];
                coalitions.row_mut(step + 1).assign(&current);
            }

            let proba = predict_proba(&coalitions)?;
            let n_classes = proba.ncols();
            let acc = phi.get_or_insert_with(|| Array2::zeros((n_features, n_classes)));
            for (step, &feature) in order.iter().enumerate() {
                let delta = &proba.row(step + 1) - &proba.row(step);
                let mut slot = acc.row_mut(feature);
                slot += &delta;
            }
        }

        let phi = phi.ok_or_else(|| TriageError::ExplanationError("no permutations ran".to_string()))?;
        let n_perm = self.n_permutations as f64;
        let n_classes = phi.ncols().max(1) as f64;
        let magnitudes: Vec<f64> = phi
            .rows()
            .into_iter()
            .map(|per_class| per_class.iter().map(|v| (v / n_perm).abs()).sum::<f64>() / n_classes)
            .collect();

        if magnitudes.iter().any(|v| !v.is_finite()) {
            return Err(TriageError::ExplanationError(
                "non-finite attribution".to_string(),
            ));
        }
        Ok(magnitudes)
    }
}

/// Column means of an attribution matrix
pub fn mean_over_rows(values: &Array2<f64>) -> Vec<f64> {
    values
        .mean_axis(Axis(0))
        .map(|m| m.to_vec())
        .unwrap_or_else(|| vec![0.0; values.ncols()])
}
