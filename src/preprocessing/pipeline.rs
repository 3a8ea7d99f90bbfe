//! Column transformer over the feature schema

use super::{OneHotEncoder, StandardScaler};
use crate::error::{Result, TriageError};
use crate::schema::{FeatureSchema, FeatureValue, FeatureVector};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Scales numeric columns, one-hot encodes categorical columns and passes
/// symptom indicators through, in that output order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    numeric: Vec<String>,
    categorical: Vec<String>,
    symptoms: Vec<String>,
    scaler: StandardScaler,
    encoder: OneHotEncoder,
    feature_names: Vec<String>,
    is_fitted: bool,
}

impl Preprocessor {
    pub fn new(schema: &FeatureSchema) -> Self {
        Self {
            numeric: schema.numeric.clone(),
            categorical: schema.categorical.clone(),
            symptoms: schema.symptoms.clone(),
            scaler: StandardScaler::new(),
            encoder: OneHotEncoder::new(),
            feature_names: Vec::new(),
            is_fitted: false,
        }
    }

    fn n_inputs(&self) -> usize {
        self.numeric.len() + self.categorical.len() + self.symptoms.len()
    }

    /// Fit on raw training vectors
    pub fn fit(&mut self, rows: &[FeatureVector]) -> Result<&mut Self> {
        let start = Instant::now();
        if rows.is_empty() {
            return Err(TriageError::PreprocessingError(
                "cannot fit preprocessor on zero rows".to_string(),
            ));
        }
        for row in rows {
            self.check_width(row)?;
        }

        let n_num = self.numeric.len();
        let numeric_cols = (0..n_num)
            .map(|col| {
                rows.iter()
                    .map(|row| number_at(row, col, &self.numeric[col]))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        let categorical_cols = (0..self.categorical.len())
            .map(|col| {
                rows.iter()
                    .map(|row| category_at(row, n_num + col, &self.categorical[col]).map(str::to_string))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        self.scaler.fit(&numeric_cols)?;
        self.encoder.fit(&categorical_cols)?;

        let mut names: Vec<String> = self.numeric.iter().map(|c| format!("num__{}", c)).collect();
        for (col, name) in self.categorical.iter().enumerate() {
            names.extend(
                self.encoder
                    .categories(col)
                    .iter()
                    .map(|cat| format!("cat__{}_{}", name, cat)),
            );
        }
        names.extend(self.symptoms.iter().map(|c| format!("remainder__{}", c)));
        self.feature_names = names;
        self.is_fitted = true;

        debug!(
            rows = rows.len(),
            outputs = self.feature_names.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fitted preprocessor"
        );
        Ok(self)
    }

    /// Transform raw vectors into the model matrix
    pub fn transform(&self, rows: &[FeatureVector]) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(TriageError::ModelNotFitted);
        }

        let width = self.feature_names.len();
        let n_num = self.numeric.len();
        let n_cat = self.categorical.len();
        let mut out = Array2::zeros((rows.len(), width));

        for (row, mut target) in rows.iter().zip(out.outer_iter_mut()) {
            self.check_width(row)?;
            let target = target
                .as_slice_mut()
                .ok_or_else(|| TriageError::PreprocessingError("non-contiguous output row".to_string()))?;

            let mut pos = 0;
            for col in 0..n_num {
                let value = number_at(row, col, &self.numeric[col])?;
                target[pos] = self.scaler.transform_value(col, value)?;
                pos += 1;
            }
            for col in 0..n_cat {
                let block = self.encoder.categories(col).len();
                let value = category_at(row, n_num + col, &self.categorical[col])?;
                self.encoder.encode_into(col, value, &mut target[pos..pos + block])?;
                pos += block;
            }
            for (offset, name) in self.symptoms.iter().enumerate() {
                target[pos] = number_at(row, n_num + n_cat + offset, name)?;
                pos += 1;
            }
        }

        Ok(out)
    }

    pub fn fit_transform(&mut self, rows: &[FeatureVector]) -> Result<Array2<f64>> {
        self.fit(rows)?;
        self.transform(rows)
    }

    /// Output column names, available after fit
    pub fn feature_names_out(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features_out(&self) -> usize {
        self.feature_names.len()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn check_width(&self, row: &FeatureVector) -> Result<()> {
        if row.len() != self.n_inputs() {
            return Err(TriageError::ShapeError {
                expected: format!("{} raw features", self.n_inputs()),
                actual: format!("{} raw features", row.len()),
            });
        }
        Ok(())
    }
}

fn number_at(row: &FeatureVector, idx: usize, name: &str) -> Result<f64> {
    match row.get(idx) {
        Some(FeatureValue::Number(v)) => Ok(*v),
        _ => Err(TriageError::PreprocessingError(format!(
            "expected a number for '{}'",
            name
        ))),
    }
}

fn category_at<'a>(row: &'a FeatureVector, idx: usize, name: &str) -> Result<&'a str> {
    match row.get(idx) {
        Some(FeatureValue::Category(c)) => Ok(c.as_str()),
        _ => Err(TriageError::PreprocessingError(format!(
            "expected a category for '{}'",
            name
        ))),
    }
}
