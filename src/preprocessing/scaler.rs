//! Feature scaling

use crate::error::{Result, TriageError};
use serde::{Deserialize, Serialize};

/// Fitted parameters for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    mean: f64,
    scale: f64,
}

/// Standard (z-score) scaler: (x - mean) / std
///
/// Uses the population standard deviation. A constant column gets scale 1,
/// so it maps to zero instead of NaN.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit on column-major values, one slice per column
    pub fn fit(&mut self, columns: &[Vec<f64>]) -> Result<&mut Self> {
        self.params = columns
            .iter()
            .map(|values| {
                if values.is_empty() {
                    return Err(TriageError::PreprocessingError(
                        "cannot fit scaler on an empty column".to_string(),
                    ));
                }
                let n = values.len() as f64;
                let mean = values.iter().sum::<f64>() / n;
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                Ok(ScalerParams {
                    mean,
                    scale: if std == 0.0 || !std.is_finite() { 1.0 } else { std },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale the value at column position `col`
    pub fn transform_value(&self, col: usize, value: f64) -> Result<f64> {
        if !self.is_fitted {
            return Err(TriageError::ModelNotFitted);
        }
        let params = self.params.get(col).ok_or_else(|| TriageError::ShapeError {
            expected: format!("column index < {}", self.params.len()),
            actual: col.to_string(),
        })?;
        Ok((value - params.mean) / params.scale)
    }

    pub fn n_columns(&self) -> usize {
        self.params.len()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
