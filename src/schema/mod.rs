//! Feature schema derivation
//!
//! The schema partitions every non-target column into three ordered groups:
//! numeric, categorical and symptom indicators. Concatenating the groups in
//! that order gives the feature order used to assemble raw inputs, both at
//! training time and when serving.

mod vector;

pub use vector::{FeatureMap, FeatureValue, FeatureVector};

use crate::error::{Result, TriageError};
use serde::{Deserialize, Serialize};

/// Default target column
pub const TARGET_COLUMN: &str = "Disease";

/// Default numeric columns
pub const NUMERIC_COLUMNS: &[&str] = &["Age"];

/// Default categorical columns
pub const CATEGORICAL_COLUMNS: &[&str] = &["Sex", "SmokingHistory", "DietType", "ExerciseFrequency"];

/// Columns declared by convention rather than inferred from dtypes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDeclaration {
    pub target: String,
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl Default for SchemaDeclaration {
    fn default() -> Self {
        Self {
            target: TARGET_COLUMN.to_string(),
            numeric: NUMERIC_COLUMNS.iter().map(|s| s.to_string()).collect(),
            categorical: CATEGORICAL_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SchemaDeclaration {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            numeric: Vec::new(),
            categorical: Vec::new(),
        }
    }

    pub fn with_numeric<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.numeric = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_categorical<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.categorical = columns.into_iter().map(Into::into).collect();
        self
    }
}

/// Role a column plays in the feature order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Symptom,
}

impl ColumnKind {
    /// Value used when a caller omits the feature.
    ///
    /// Categorical columns default to the category `"0"`, which is what a
    /// caller sending a literal `0` produces, so omitted and zeroed inputs
    /// encode identically.
    pub fn default_value(self) -> FeatureValue {
        match self {
            ColumnKind::Numeric | ColumnKind::Symptom => FeatureValue::Number(0.0),
            ColumnKind::Categorical => FeatureValue::Category("0".to_string()),
        }
    }
}

/// Ordered partition of the input columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub symptoms: Vec<String>,
    pub target: String,
}

impl FeatureSchema {
    /// Derive the schema from a table's column names.
    ///
    /// Symptoms are every column that is neither the target nor declared
    /// numeric/categorical, in table order. Fails only if the target column
    /// is absent.
    pub fn derive<S: AsRef<str>>(columns: &[S], declaration: &SchemaDeclaration) -> Result<Self> {
        if !columns.iter().any(|c| c.as_ref() == declaration.target) {
            return Err(TriageError::FeatureNotFound(declaration.target.clone()));
        }

        let symptoms = columns
            .iter()
            .map(|c| c.as_ref())
            .filter(|c| {
                *c != declaration.target
                    && !declaration.numeric.iter().any(|n| n == c)
                    && !declaration.categorical.iter().any(|k| k == c)
            })
            .map(|c| c.to_string())
            .collect();

        Ok(Self {
            numeric: declaration.numeric.clone(),
            categorical: declaration.categorical.clone(),
            symptoms,
            target: declaration.target.clone(),
        })
    }

    /// Raw input order: numeric, then categorical, then symptoms
    pub fn feature_order(&self) -> Vec<String> {
        self.numeric
            .iter()
            .chain(self.categorical.iter())
            .chain(self.symptoms.iter())
            .cloned()
            .collect()
    }

    pub fn n_features(&self) -> usize {
        self.numeric.len() + self.categorical.len() + self.symptoms.len()
    }

    /// Kind of each position in the feature order
    pub fn kinds(&self) -> Vec<ColumnKind> {
        std::iter::repeat(ColumnKind::Numeric)
            .take(self.numeric.len())
            .chain(std::iter::repeat(ColumnKind::Categorical).take(self.categorical.len()))
            .chain(std::iter::repeat(ColumnKind::Symptom).take(self.symptoms.len()))
            .collect()
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        if self.numeric.iter().any(|c| c == name) {
            Some(ColumnKind::Numeric)
        } else if self.categorical.iter().any(|c| c == name) {
            Some(ColumnKind::Categorical)
        } else if self.symptoms.iter().any(|c| c == name) {
            Some(ColumnKind::Symptom)
        } else {
            None
        }
    }

    /// Position of a feature in the feature order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.feature_order().iter().position(|c| c == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<&'static str> {
        vec![
            "Age", "Sex", "Fever", "SmokingHistory", "Cough", "DietType",
            "ExerciseFrequency", "Disease", "Fatigue",
        ]
    }

    #[test]
    fn test_derive_symptoms_preserve_table_order() {
        let schema = FeatureSchema::derive(&columns(), &SchemaDeclaration::default()).unwrap();
        assert_eq!(schema.symptoms, vec!["Fever", "Cough", "Fatigue"]);
        assert_eq!(schema.target, "Disease");
    }

    #[test]
    fn test_groups_partition_non_target_columns() {
        let schema = FeatureSchema::derive(&columns(), &SchemaDeclaration::default()).unwrap();
        let order = schema.feature_order();

        let mut expected: Vec<String> = columns()
            .into_iter()
            .filter(|c| *c != "Disease")
            .map(String::from)
            .collect();
        let mut actual = order.clone();
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected);

        let mut dedup = order.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), order.len(), "groups must not overlap");
    }

    #[test]
    fn test_feature_order_is_stable() {
        let schema = FeatureSchema::derive(&columns(), &SchemaDeclaration::default()).unwrap();
        let first = schema.feature_order();
        let second = schema.feature_order();
        assert_eq!(first, second);
        assert_eq!(&first[..5], &["Age", "Sex", "SmokingHistory", "DietType", "ExerciseFrequency"]);
    }

    #[test]
    fn test_missing_target_fails() {
        let result = FeatureSchema::derive(&["Age", "Fever"], &SchemaDeclaration::default());
        assert!(matches!(result, Err(TriageError::FeatureNotFound(_))));
    }

    #[test]
    fn test_kinds_align_with_order() {
        let schema = FeatureSchema::derive(&columns(), &SchemaDeclaration::default()).unwrap();
        let kinds = schema.kinds();
        assert_eq!(kinds.len(), schema.n_features());
        assert_eq!(kinds[0], ColumnKind::Numeric);
        assert_eq!(kinds[1], ColumnKind::Categorical);
        assert_eq!(kinds[5], ColumnKind::Symptom);
        assert_eq!(schema.kind_of("Cough"), Some(ColumnKind::Symptom));
        assert_eq!(schema.kind_of("Disease"), None);
    }

    #[test]
    fn test_custom_declaration() {
        let decl = SchemaDeclaration::new("label")
            .with_numeric(["x"])
            .with_categorical(Vec::<String>::new());
        let schema = FeatureSchema::derive(&["x", "y", "label"], &decl).unwrap();
        assert_eq!(schema.feature_order(), vec!["x", "y"]);
    }
}
