//! Categorical encoding

use crate::error::{Result, TriageError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoder.
///
/// Each column gets one output block holding its categories in sorted order.
/// A category not seen during fit encodes as an all-zero block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit on column-major values, one slice per column
    pub fn fit(&mut self, columns: &[Vec<String>]) -> Result<&mut Self> {
        self.categories = columns
            .iter()
            .map(|values| {
                values
                    .iter()
                    .cloned()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            })
            .collect();
        self.is_fitted = true;
        Ok(self)
    }

    /// Write the block for column `col` into `out`, which must be as long as
    /// that column's category list
    pub fn encode_into(&self, col: usize, value: &str, out: &mut [f64]) -> Result<()> {
        if !self.is_fitted {
            return Err(TriageError::ModelNotFitted);
        }
        let categories = self.categories.get(col).ok_or_else(|| TriageError::ShapeError {
            expected: format!("column index < {}", self.categories.len()),
            actual: col.to_string(),
        })?;
        if out.len() != categories.len() {
            return Err(TriageError::ShapeError {
                expected: format!("{} slots", categories.len()),
                actual: format!("{} slots", out.len()),
            });
        }

        out.iter_mut().for_each(|v| *v = 0.0);
        if let Ok(pos) = categories.binary_search_by(|c| c.as_str().cmp(value)) {
            out[pos] = 1.0;
        }
        Ok(())
    }

    /// Sorted categories of column `col`
    pub fn categories(&self, col: usize) -> &[String] {
        self.categories.get(col).map(|c| c.as_slice()).unwrap_or(&[])
    }

    /// Total width of all blocks
    pub fn width(&self) -> usize {
        self.categories.iter().map(|c| c.len()).sum()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> OneHotEncoder {
        let mut encoder = OneHotEncoder::new();
        encoder
            .fit(&[vec!["Male".into(), "Female".into(), "Male".into()]])
            .unwrap();
        encoder
    }

    #[test]
    fn test_sorted_categories() {
        let encoder = fitted();
        assert_eq!(encoder.categories(0), &["Female".to_string(), "Male".to_string()]);
        assert_eq!(encoder.width(), 2);
    }

    #[test]
    fn test_encode_known() {
        let encoder = fitted();
        let mut out = [0.0; 2];
        encoder.encode_into(0, "Male", &mut out).unwrap();
        assert_eq!(out, [0.0, 1.0]);
    }

    #[test]
    fn test_unknown_is_all_zero() {
        let encoder = fitted();
        let mut out = [9.0; 2];
        encoder.encode_into(0, "Other", &mut out).unwrap();
        assert_eq!(out, [0.0, 0.0]);
    }

    #[test]
    fn test_wrong_block_width() {
        let encoder = fitted();
        let mut out = [0.0; 3];
        assert!(encoder.encode_into(0, "Male", &mut out).is_err());
    }
}
