//! Inference engine

use crate::error::{Result, TriageError};
use crate::explainability::{explain_vector, ExplainConfig, Explanation};
use crate::model::ModelBundle;
use crate::schema::FeatureMap;
use crate::training::random_forest::argmax;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

/// Liveness payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
    pub features: Vec<String>,
}

/// Schema payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub symptoms: Vec<String>,
    pub target: String,
    pub feature_order: Vec<String>,
}

/// Prediction payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: String,
    pub confidence: f64,
    pub explanation: Explanation,
}

/// Serves predictions from a loaded bundle.
///
/// Immutable after construction, so one instance can be shared across
/// request handlers without locking.
#[derive(Debug)]
pub struct InferenceEngine {
    bundle: ModelBundle,
    explain: ExplainConfig,
    loaded_at: DateTime<Utc>,
}

impl InferenceEngine {
    pub fn new(bundle: ModelBundle, explain: ExplainConfig) -> Self {
        Self {
            bundle,
            explain,
            loaded_at: Utc::now(),
        }
    }

    /// Load the bundle from disk
    pub fn load(path: &Path, explain: ExplainConfig) -> Result<Self> {
        let bundle = ModelBundle::load(path)?;
        Ok(Self::new(bundle, explain))
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            model_loaded: true,
            features: self.bundle.schema.feature_order(),
        }
    }

    pub fn schema(&self) -> SchemaInfo {
        let schema = &self.bundle.schema;
        SchemaInfo {
            numeric: schema.numeric.clone(),
            categorical: schema.categorical.clone(),
            symptoms: schema.symptoms.clone(),
            target: schema.target.clone(),
            feature_order: schema.feature_order(),
        }
    }

    /// Predict one request.
    ///
    /// Invalid values fail with [`TriageError::InvalidInput`]. Explanation
    /// failures never fail the prediction; they yield method `none`.
    pub fn predict(&self, map: &FeatureMap) -> Result<Prediction> {
        let start = Instant::now();
        let vector = self.bundle.feature_vector(map)?;
        let proba = self
            .bundle
            .pipeline
            .predict_proba(std::slice::from_ref(&vector))?;

        let row = proba
            .rows()
            .into_iter()
            .next()
            .ok_or_else(|| TriageError::InferenceError("model returned no rows".to_string()))?;
        let best = argmax(row.iter().copied());
        let confidence = row[best];
        let prediction = self
            .bundle
            .pipeline
            .classes()
            .get(best)
            .cloned()
            .ok_or_else(|| TriageError::InferenceError(format!("no label for class {}", best)))?;

        let explanation = explain_vector(&self.bundle, &vector, &self.explain).unwrap_or_else(|e| {
            warn!(error = %e, "Local explanation failed");
            Explanation::none()
        });

        debug!(
            prediction = %prediction,
            confidence,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Prediction served"
        );
        Ok(Prediction {
            prediction,
            confidence,
            explanation,
        })
    }
}
