//! Fitted pipeline and the persisted model bundle

use crate::error::{Result, TriageError};
use crate::preprocessing::Preprocessor;
use crate::schema::{FeatureMap, FeatureSchema, FeatureVector};
use crate::training::random_forest::{argmax, RandomForest};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

/// Preprocessor and classifier fitted together, with the label mapping and
/// the attribution background.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPipeline {
    preprocessor: Preprocessor,
    classifier: RandomForest,
    /// Class index to label, sorted
    classes: Vec<String>,
    /// Seeded sample of transformed training rows
    background: Array2<f64>,
}

impl FittedPipeline {
    pub fn new(
        preprocessor: Preprocessor,
        classifier: RandomForest,
        classes: Vec<String>,
        background: Array2<f64>,
    ) -> Result<Self> {
        if classifier.n_classes() != classes.len() {
            return Err(TriageError::ShapeError {
                expected: format!("{} classes", classifier.n_classes()),
                actual: format!("{} labels", classes.len()),
            });
        }
        if background.nrows() > 0 && background.ncols() != preprocessor.n_features_out() {
            return Err(TriageError::ShapeError {
                expected: format!("{} background columns", preprocessor.n_features_out()),
                actual: format!("{} background columns", background.ncols()),
            });
        }
        Ok(Self {
            preprocessor,
            classifier,
            classes,
            background,
        })
    }

    pub fn transform(&self, rows: &[FeatureVector]) -> Result<Array2<f64>> {
        self.preprocessor.transform(rows)
    }

    /// Class probabilities for already transformed rows
    pub fn predict_proba_transformed(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.classifier.predict_proba(x)
    }

    pub fn predict_proba(&self, rows: &[FeatureVector]) -> Result<Array2<f64>> {
        let x = self.transform(rows)?;
        self.predict_proba_transformed(&x)
    }

    /// Most probable label per row
    pub fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<String>> {
        let proba = self.predict_proba(rows)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| self.classes[argmax(row.iter().copied())].clone())
            .collect())
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn feature_names_out(&self) -> &[String] {
        self.preprocessor.feature_names_out()
    }

    /// Impurity importances aligned with [`Self::feature_names_out`]
    pub fn feature_importances(&self) -> Option<&[f64]> {
        self.classifier.feature_importances()
    }

    pub fn background(&self) -> &Array2<f64> {
        &self.background
    }

    pub fn classifier(&self) -> &RandomForest {
        &self.classifier
    }
}

/// Hold-out parameters the pipeline was trained with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitSettings {
    pub test_size: f64,
    pub random_state: u64,
}

/// Everything needed to serve: the fitted pipeline, its schema and the split
/// that produced it. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub pipeline: FittedPipeline,
    pub schema: FeatureSchema,
    pub split: SplitSettings,
}

impl ModelBundle {
    pub fn new(pipeline: FittedPipeline, schema: FeatureSchema, split: SplitSettings) -> Self {
        Self { pipeline, schema, split }
    }

    /// Assemble the dense raw vector for a request map
    pub fn feature_vector(&self, map: &FeatureMap) -> Result<FeatureVector> {
        FeatureVector::from_map(&self.schema, map)
    }

    /// Write the bundle, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        info!(path = %path.display(), "Saved model bundle");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            TriageError::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to open model bundle {}: {}", path.display(), e),
            ))
        })?;
        let bundle: Self = bincode::deserialize_from(BufReader::new(file))?;
        info!(
            path = %path.display(),
            features = bundle.schema.n_features(),
            classes = bundle.pipeline.classes().len(),
            "Loaded model bundle"
        );
        Ok(bundle)
    }
}
