//! Training engine

use super::metrics::{ClassificationReport, ModelMetrics};
use super::random_forest::RandomForest;
use super::split::stratified_split;
use super::TrainingConfig;
use crate::config::ArtifactPaths;
use crate::data::Dataset;
use crate::error::{Result, TriageError};
use crate::model::{FittedPipeline, ModelBundle, SplitSettings};
use crate::preprocessing::Preprocessor;
use ndarray::{Array2, Axis};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Held-out evaluation written after training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub accuracy: f64,
    pub precision_weighted: f64,
    pub recall_weighted: f64,
    pub f1_weighted: f64,
    pub classification_report: ClassificationReport,
}

impl TrainingReport {
    fn new(metrics: ModelMetrics, classification_report: ClassificationReport) -> Self {
        Self {
            accuracy: metrics.accuracy,
            precision_weighted: metrics.precision_weighted,
            recall_weighted: metrics.recall_weighted,
            f1_weighted: metrics.f1_weighted,
            classification_report,
        }
    }

    /// Write as pretty JSON, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Fitted bundle plus its held-out report
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub bundle: ModelBundle,
    pub report: TrainingReport,
    pub n_train: usize,
    pub n_test: usize,
}

/// Fits the preprocessing + forest pipeline and evaluates it
pub struct TrainEngine {
    config: TrainingConfig,
}

impl TrainEngine {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Load the dataset, fit, then persist the bundle and the report.
    ///
    /// Nothing is written unless every step succeeds.
    pub fn run(&self, paths: &ArtifactPaths) -> Result<TrainingReport> {
        let dataset = Dataset::load(&paths.data, &self.config.declaration)?;
        let outcome = self.fit(&dataset)?;

        outcome.bundle.save(&paths.model)?;
        outcome.report.save(&paths.training_report)?;

        info!(
            model = %paths.model.display(),
            report = %paths.training_report.display(),
            accuracy = outcome.report.accuracy,
            f1_weighted = outcome.report.f1_weighted,
            "Training artifacts written"
        );
        Ok(outcome.report)
    }

    /// Split, fit on the training side and evaluate on the held-out side
    pub fn fit(&self, dataset: &Dataset) -> Result<TrainingOutcome> {
        let start = Instant::now();
        if dataset.is_empty() {
            return Err(TriageError::DataError("dataset has no rows".to_string()));
        }

        let labels = dataset.labels();
        let split = stratified_split(&labels, self.config.test_size, self.config.random_state)?;

        let train = dataset.select(&split.train);
        let test = dataset.select(&split.test);
        let x_rows: Vec<_> = train.iter().map(|r| r.features.clone()).collect();
        let y_labels: Vec<&str> = train.iter().map(|r| r.label.as_str()).collect();

        let classes: Vec<String> = y_labels
            .iter()
            .map(|s| s.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let y: Vec<usize> = y_labels
            .iter()
            .map(|label| classes.binary_search_by(|c| c.as_str().cmp(label)).unwrap_or(0))
            .collect();

        let mut preprocessor = Preprocessor::new(dataset.schema());
        let x_train = preprocessor.fit_transform(&x_rows)?;

        let mut forest = RandomForest::new(self.config.n_estimators)
            .with_max_depth(self.config.max_depth)
            .with_min_samples_split(self.config.min_samples_split)
            .with_min_samples_leaf(self.config.min_samples_leaf)
            .with_max_features(self.config.max_features)
            .with_bootstrap(self.config.bootstrap)
            .with_class_weight(self.config.class_weight)
            .with_random_state(self.config.random_state);
        forest.fit(&x_train, &y, classes.len())?;

        let background = self.sample_background(&x_train);
        let pipeline = FittedPipeline::new(preprocessor, forest, classes, background)?;

        let test_rows: Vec<_> = test.iter().map(|r| r.features.clone()).collect();
        let y_true: Vec<String> = test.iter().map(|r| r.label.clone()).collect();
        let y_pred = pipeline.predict(&test_rows)?;

        let report = TrainingReport::new(
            ModelMetrics::compute(&y_true, &y_pred),
            ClassificationReport::compute(&y_true, &y_pred),
        );

        info!(
            rows = dataset.len(),
            train = split.train.len(),
            test = split.test.len(),
            classes = pipeline.classes().len(),
            features_out = pipeline.feature_names_out().len(),
            accuracy = report.accuracy,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Training complete"
        );

        Ok(TrainingOutcome {
            bundle: ModelBundle::new(
                pipeline,
                dataset.schema().clone(),
                SplitSettings {
                    test_size: self.config.test_size,
                    random_state: self.config.random_state,
                },
            ),
            report,
            n_train: split.train.len(),
            n_test: split.test.len(),
        })
    }

    fn sample_background(&self, x: &Array2<f64>) -> Array2<f64> {
        let size = self.config.background_size.min(x.nrows());
        if size == x.nrows() {
            return x.clone();
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.random_state);
        let mut picked = rand::seq::index::sample(&mut rng, x.nrows(), size).into_vec();
        picked.sort_unstable();
        x.select(Axis(0), &picked)
    }
}
