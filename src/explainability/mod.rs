//! Model explainability
//!
//! Attributions come from the first strategy that works:
//! 1. Shapley sampling against the pipeline's background rows
//! 2. the forest's impurity importances
//! 3. nothing
//!
//! [`global`] ranks features over the dataset and writes the result to disk;
//! [`local`] explains a single request and is only returned.

pub mod global;
pub mod local;
mod shapley;

pub use global::{global_explain, GlobalExplanation, RankedFeature};
pub use local::{explain_vector, local_explain, Contribution, Explanation};
pub use shapley::{mean_over_rows, ShapleySampler};

use crate::error::Result;
use crate::model::FittedPipeline;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Method label carried by every explanation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationMethod {
    Shap,
    FeatureImportances,
    FeatureImportancesFallback,
    #[serde(rename = "none")]
    Unavailable,
}

/// Per-feature magnitudes over the pipeline's output features, tagged with
/// the strategy that produced them
#[derive(Debug, Clone, PartialEq)]
pub enum Attribution {
    Shapley(Vec<f64>),
    Fallback(Vec<f64>),
    Unavailable,
}

/// Explanation tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainConfig {
    /// Try Shapley sampling before falling back
    pub shap_enabled: bool,
    /// Rows explained by the global explanation
    pub sample_size: usize,
    /// Permutations per explained row
    pub n_permutations: usize,
    pub random_state: u64,
    pub global_top_k: usize,
    pub local_top_k: usize,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            shap_enabled: true,
            sample_size: 200,
            n_permutations: 10,
            random_state: 42,
            global_top_k: 20,
            local_top_k: 6,
        }
    }
}

impl ExplainConfig {
    pub fn with_shap_enabled(mut self, enabled: bool) -> Self {
        self.shap_enabled = enabled;
        self
    }

    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size.max(1);
        self
    }

    pub fn with_n_permutations(mut self, n: usize) -> Self {
        self.n_permutations = n.max(1);
        self
    }
}

/// Attribute the transformed rows `x`, degrading through the strategies.
///
/// Never fails: a Shapley error falls through to the importances.
pub fn attribute(pipeline: &FittedPipeline, x: &Array2<f64>, config: &ExplainConfig) -> Attribution {
    attribute_with(pipeline, x, config, |rows| pipeline.predict_proba_transformed(rows))
}

/// [`attribute`] with the probability function the sampler queries
pub(crate) fn attribute_with<F>(
    pipeline: &FittedPipeline,
    x: &Array2<f64>,
    config: &ExplainConfig,
    predict_proba: F,
) -> Attribution
where
    F: Fn(&Array2<f64>) -> Result<Array2<f64>> + Sync,
{
    let background = pipeline.background();
    if config.shap_enabled && background.nrows() > 0 && x.nrows() > 0 {
        let sampler = ShapleySampler::new(background)
            .with_n_permutations(config.n_permutations)
            .with_seed(config.random_state);
        match sampler.explain(predict_proba, x) {
            Ok(values) => return Attribution::Shapley(mean_over_rows(&values)),
            Err(e) => warn!(error = %e, "Shapley attribution failed, using importances"),
        }
    }

    match pipeline.feature_importances() {
        Some(importances) if !importances.is_empty() => Attribution::Fallback(importances.to_vec()),
        _ => Attribution::Unavailable,
    }
}

/// Pair names with values and keep the `top_k` largest magnitudes
pub(crate) fn rank(names: &[String], values: &[f64], top_k: usize) -> Vec<(String, f64)> {
    let mut pairs: Vec<(String, f64)> = names.iter().cloned().zip(values.iter().copied()).collect();
    pairs.sort_by(|a, b| {
        b.1.abs()
            .partial_cmp(&a.1.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    pairs.truncate(top_k);
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TriageError;
    use crate::test_support;

    #[test]
    fn test_method_names() {
        let names: Vec<String> = [
            ExplanationMethod::Shap,
            ExplanationMethod::FeatureImportances,
            ExplanationMethod::FeatureImportancesFallback,
            ExplanationMethod::Unavailable,
        ]
        .iter()
        .map(|m| serde_json::to_value(m).unwrap().as_str().unwrap().to_string())
        .collect();
        assert_eq!(names, ["shap", "feature_importances", "feature_importances_fallback", "none"]);
    }

    #[test]
    fn test_sampler_error_falls_back_to_importances() {
        let bundle = test_support::bundle();
        let pipeline = &bundle.pipeline;
        let x = pipeline.background().clone();

        let failing = |_: &Array2<f64>| -> Result<Array2<f64>> {
            Err(TriageError::ExplanationError("model unavailable".to_string()))
        };
        let attribution = attribute_with(pipeline, &x, &ExplainConfig::default(), failing);

        let expected = pipeline.feature_importances().unwrap().to_vec();
        assert_eq!(attribution, Attribution::Fallback(expected));
    }

    #[test]
    fn test_rank_descending_and_truncated() {
        let names: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let ranked = rank(&names, &[0.1, -0.5, 0.3], 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, "b");
        assert_eq!(ranked[1].0, "c");
    }

    #[test]
    fn test_rank_top_k_larger_than_features() {
        let names = vec!["only".to_string()];
        assert_eq!(rank(&names, &[1.0], 20).len(), 1);
    }
}
