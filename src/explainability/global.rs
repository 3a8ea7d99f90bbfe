//! Dataset-level explanation

use super::{attribute, rank, Attribution, ExplainConfig, ExplanationMethod};
use crate::data::Dataset;
use crate::error::{Result, TriageError};
use crate::model::ModelBundle;
use ndarray::Axis;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFeature {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalExplanation {
    pub method: ExplanationMethod,
    pub top_features: Vec<RankedFeature>,
}

impl GlobalExplanation {
    /// Write as pretty JSON, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Rank output features by attribution over a seeded sample of the dataset.
///
/// The bundle's fitted preprocessor is reapplied, never refit. The dataset
/// must carry the bundle's feature order.
pub fn global_explain(
    bundle: &ModelBundle,
    dataset: &Dataset,
    config: &ExplainConfig,
) -> Result<GlobalExplanation> {
    let start = Instant::now();
    if dataset.schema().feature_order() != bundle.schema.feature_order() {
        return Err(TriageError::SchemaError(
            "dataset columns do not match the model schema".to_string(),
        ));
    }

    let pipeline = &bundle.pipeline;
    let x = pipeline.transform(&dataset.vectors())?;

    let n = config.sample_size.min(x.nrows());
    let sample = if n < x.nrows() {
        let mut rng = ChaCha8Rng::seed_from_u64(config.random_state);
        let mut picked = rand::seq::index::sample(&mut rng, x.nrows(), n).into_vec();
        picked.sort_unstable();
        x.select(Axis(0), &picked)
    } else {
        x
    };

    let (method, values) = match attribute(pipeline, &sample, config) {
        Attribution::Shapley(v) => (ExplanationMethod::Shap, v),
        Attribution::Fallback(v) => (ExplanationMethod::FeatureImportances, v),
        Attribution::Unavailable => (ExplanationMethod::Unavailable, Vec::new()),
    };

    let top_features = rank(pipeline.feature_names_out(), &values, config.global_top_k)
        .into_iter()
        .map(|(feature, importance)| RankedFeature { feature, importance })
        .collect();

    info!(
        method = ?method,
        rows = sample.nrows(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Global explanation computed"
    );
    Ok(GlobalExplanation { method, top_features })
}
