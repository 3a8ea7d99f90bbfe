//! Per-request explanation

use super::{attribute_with, rank, Attribution, ExplainConfig, ExplanationMethod};
use crate::error::Result;
use ndarray::Array2;
use crate::model::ModelBundle;
use crate::schema::{FeatureMap, FeatureVector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub feature: String,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub method: ExplanationMethod,
    pub top_contributors: Vec<Contribution>,
}

impl Explanation {
    /// The empty explanation returned when nothing else works
    pub fn none() -> Self {
        Self {
            method: ExplanationMethod::Unavailable,
            top_contributors: Vec::new(),
        }
    }
}

/// Explain one request map.
///
/// The fallback reports the forest's global importances, which are the same
/// for every request.
pub fn local_explain(bundle: &ModelBundle, map: &FeatureMap, config: &ExplainConfig) -> Result<Explanation> {
    let vector = bundle.feature_vector(map)?;
    explain_vector(bundle, &vector, config)
}

/// Explain an already assembled raw vector
pub fn explain_vector(bundle: &ModelBundle, vector: &FeatureVector, config: &ExplainConfig) -> Result<Explanation> {
    explain_vector_with(bundle, vector, config, |rows| bundle.pipeline.predict_proba_transformed(rows))
}

fn explain_vector_with<F>(
    bundle: &ModelBundle,
    vector: &FeatureVector,
    config: &ExplainConfig,
    predict_proba: F,
) -> Result<Explanation>
where
    F: Fn(&Array2<f64>) -> Result<Array2<f64>> + Sync,
{
    let x = bundle.pipeline.transform(std::slice::from_ref(vector))?;

    let (method, values) = match attribute_with(&bundle.pipeline, &x, config, predict_proba) {
        Attribution::Shapley(v) => (ExplanationMethod::Shap, v),
        Attribution::Fallback(v) => (ExplanationMethod::FeatureImportancesFallback, v),
        Attribution::Unavailable => return Ok(Explanation::none()),
    };

    let top_contributors = rank(bundle.pipeline.feature_names_out(), &values, config.local_top_k)
        .into_iter()
        .map(|(feature, contribution)| Contribution { feature, contribution })
        .collect();

    Ok(Explanation { method, top_contributors })
}
