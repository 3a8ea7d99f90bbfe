//! Fairness audit
//!
//! Reproduces the training split, predicts the held-out rows and reports
//! weighted metrics overall and per demographic slice.

use crate::data::{DataSaver, Dataset, PatientRecord};
use crate::error::{Result, TriageError};
use crate::model::ModelBundle;
use crate::schema::FeatureValue;
use crate::training::{stratified_split, ModelMetrics};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Label of the whole-test-set row
pub const OVERALL: &str = "OVERALL";

/// Age range with an exclusive lower bound (none for the first bucket)
/// and an inclusive upper bound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeBucket {
    pub label: String,
    pub above: Option<f64>,
    pub up_to: f64,
}

impl AgeBucket {
    pub fn new(label: impl Into<String>, above: Option<f64>, up_to: f64) -> Self {
        Self {
            label: label.into(),
            above,
            up_to,
        }
    }

    /// Ages outside [0, 200] belong to no bucket
    pub fn contains(&self, age: f64) -> bool {
        (0.0..=200.0).contains(&age)
            && self.above.map_or(true, |lower| age > lower)
            && age <= self.up_to
    }
}

/// Configuration for the audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairnessConfig {
    pub sex_column: String,
    /// Sex values reported, in this order
    pub sex_values: Vec<String>,
    pub age_column: String,
    /// Age buckets reported, in this order
    pub age_buckets: Vec<AgeBucket>,
    /// Split overrides; unset values come from the bundle
    pub test_size: Option<f64>,
    pub random_state: Option<u64>,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            sex_column: "Sex".to_string(),
            sex_values: vec!["Male".to_string(), "Female".to_string()],
            age_column: "Age".to_string(),
            age_buckets: vec![
                AgeBucket::new("<=30", None, 30.0),
                AgeBucket::new("31-45", Some(30.0), 45.0),
                AgeBucket::new("46-60", Some(45.0), 60.0),
                AgeBucket::new("60+", Some(60.0), 200.0),
            ],
            test_size: None,
            random_state: None,
        }
    }
}

impl FairnessConfig {
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = Some(test_size);
        self
    }

    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    pub fn with_sex_values<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.sex_values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Metrics for one slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessRow {
    pub group: String,
    pub accuracy: f64,
    pub precision_weighted: f64,
    pub recall_weighted: f64,
    pub f1_weighted: f64,
}

impl FairnessRow {
    fn new(group: String, metrics: ModelMetrics) -> Self {
        Self {
            group,
            accuracy: metrics.accuracy,
            precision_weighted: metrics.precision_weighted,
            recall_weighted: metrics.recall_weighted,
            f1_weighted: metrics.f1_weighted,
        }
    }
}

/// Ordered slice rows: OVERALL, then sex, then age
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessReport {
    pub rows: Vec<FairnessRow>,
}

impl FairnessReport {
    pub fn get(&self, group: &str) -> Option<&FairnessRow> {
        self.rows.iter().find(|r| r.group == group)
    }

    pub fn to_frame(&self) -> Result<DataFrame> {
        let column = |name: &str, f: fn(&FairnessRow) -> f64| {
            Column::new(name.into(), self.rows.iter().map(f).collect::<Vec<f64>>())
        };
        let groups: Vec<&str> = self.rows.iter().map(|r| r.group.as_str()).collect();
        let df = DataFrame::new(vec![
            Column::new("group".into(), groups),
            column("accuracy", |r| r.accuracy),
            column("precision_weighted", |r| r.precision_weighted),
            column("recall_weighted", |r| r.recall_weighted),
            column("f1_weighted", |r| r.f1_weighted),
        ])?;
        Ok(df)
    }

    /// Write as CSV, replacing any existing file
    pub fn save_csv(&self, path: &Path) -> Result<()> {
        let mut df = self.to_frame()?;
        DataSaver::save_csv(&mut df, path)
    }
}

/// Computes slice metrics for a bundle on its held-out split
pub struct FairnessAuditor {
    config: FairnessConfig,
}

impl FairnessAuditor {
    pub fn new(config: FairnessConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, bundle: &ModelBundle, dataset: &Dataset) -> Result<FairnessReport> {
        let start = Instant::now();
        if dataset.schema().feature_order() != bundle.schema.feature_order() {
            return Err(TriageError::SchemaError(
                "dataset columns do not match the model schema".to_string(),
            ));
        }

        let test_size = self.config.test_size.unwrap_or(bundle.split.test_size);
        let random_state = self.config.random_state.unwrap_or(bundle.split.random_state);
        let split = stratified_split(&dataset.labels(), test_size, random_state)?;
        let test = dataset.select(&split.test);
        let rows: Vec<_> = test.iter().map(|r| r.features.clone()).collect();
        let y_true: Vec<String> = test.iter().map(|r| r.label.clone()).collect();
        let y_pred = bundle.pipeline.predict(&rows)?;

        let mut report = FairnessReport {
            rows: vec![FairnessRow::new(OVERALL.to_string(), ModelMetrics::compute(&y_true, &y_pred))],
        };

        let slice = |keep: &dyn Fn(&PatientRecord) -> bool| -> Option<ModelMetrics> {
            let (t, p): (Vec<&str>, Vec<&str>) = test
                .iter()
                .zip(&y_pred)
                .filter(|(record, _)| keep(record))
                .map(|(record, pred)| (record.label.as_str(), pred.as_str()))
                .unzip();
            (!t.is_empty()).then(|| ModelMetrics::compute(&t, &p))
        };

        match bundle.schema.position(&self.config.sex_column) {
            Some(pos) => {
                for value in &self.config.sex_values {
                    let keep = |r: &PatientRecord| {
                        matches!(r.features.get(pos), Some(FeatureValue::Category(c)) if c == value)
                    };
                    if let Some(metrics) = slice(&keep) {
                        report
                            .rows
                            .push(FairnessRow::new(format!("{}={}", self.config.sex_column, value), metrics));
                    }
                }
            }
            None => warn!(column = %self.config.sex_column, "Sex column not in schema, skipping"),
        }

        match bundle.schema.position(&self.config.age_column) {
            Some(pos) => {
                for bucket in &self.config.age_buckets {
                    let keep = |r: &PatientRecord| {
                        r.features
                            .get(pos)
                            .and_then(FeatureValue::as_number)
                            .map_or(false, |age| bucket.contains(age))
                    };
                    if let Some(metrics) = slice(&keep) {
                        report
                            .rows
                            .push(FairnessRow::new(format!("{}={}", self.config.age_column, bucket.label), metrics));
                    }
                }
            }
            None => warn!(column = %self.config.age_column, "Age column not in schema, skipping"),
        }

        info!(
            test_rows = test.len(),
            groups = report.rows.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fairness audit complete"
        );
        Ok(report)
    }
}
