//! Dense feature vectors assembled from sparse request maps

use super::{ColumnKind, FeatureSchema};
use crate::error::{Result, TriageError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sparse request-time input: feature name to raw JSON value
pub type FeatureMap = serde_json::Map<String, Value>;

/// A single raw feature value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(v) => Some(*v),
            FeatureValue::Category(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            FeatureValue::Category(c) => Some(c.as_str()),
            FeatureValue::Number(_) => None,
        }
    }
}

/// Raw feature values aligned with [`FeatureSchema::feature_order`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: Vec<FeatureValue>,
}

impl FeatureVector {
    /// Wrap values that are already in feature order
    pub fn new(schema: &FeatureSchema, values: Vec<FeatureValue>) -> Result<Self> {
        if values.len() != schema.n_features() {
            return Err(TriageError::ShapeError {
                expected: format!("{} features", schema.n_features()),
                actual: format!("{} features", values.len()),
            });
        }
        Ok(Self { values })
    }

    /// Build the dense vector from a sparse map.
    ///
    /// Missing keys take the column default, unknown keys are ignored. Type
    /// mismatches (non-numeric text for a numeric column, arrays, objects)
    /// are errors.
    pub fn from_map(schema: &FeatureSchema, map: &FeatureMap) -> Result<Self> {
        let values = schema
            .feature_order()
            .iter()
            .zip(schema.kinds())
            .map(|(name, kind)| match map.get(name) {
                Some(raw) => coerce(name, kind, raw),
                None => Ok(kind.default_value()),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { values })
    }

    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }

    pub fn get(&self, idx: usize) -> Option<&FeatureValue> {
        self.values.get(idx)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn coerce(name: &str, kind: ColumnKind, raw: &Value) -> Result<FeatureValue> {
    match kind {
        ColumnKind::Numeric | ColumnKind::Symptom => match raw {
            Value::Null => Ok(kind.default_value()),
            Value::Number(n) => n
                .as_f64()
                .map(FeatureValue::Number)
                .ok_or_else(|| type_error(name, "a number", raw)),
            Value::Bool(b) => Ok(FeatureValue::Number(if *b { 1.0 } else { 0.0 })),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(FeatureValue::Number)
                .map_err(|_| type_error(name, "a number", raw)),
            Value::Array(_) | Value::Object(_) => Err(type_error(name, "a number", raw)),
        },
        ColumnKind::Categorical => match raw {
            Value::Null => Ok(kind.default_value()),
            Value::String(s) => Ok(FeatureValue::Category(s.clone())),
            Value::Number(n) => Ok(FeatureValue::Category(n.to_string())),
            Value::Bool(b) => Ok(FeatureValue::Category(b.to_string())),
            Value::Array(_) | Value::Object(_) => Err(type_error(name, "a category", raw)),
        },
    }
}

fn type_error(name: &str, expected: &str, raw: &Value) -> TriageError {
    TriageError::InvalidInput(format!("feature '{}' expects {}, got {}", name, expected, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaDeclaration;
    use serde_json::json;

    fn schema() -> FeatureSchema {
        FeatureSchema::derive(
            &["Age", "Sex", "SmokingHistory", "DietType", "ExerciseFrequency", "Fever", "Cough", "Disease"],
            &SchemaDeclaration::default(),
        )
        .unwrap()
    }

    fn map(value: Value) -> FeatureMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_missing_keys_default() {
        let vector = FeatureVector::from_map(&schema(), &FeatureMap::new()).unwrap();
        assert_eq!(vector.len(), 7);
        assert_eq!(vector.get(0), Some(&FeatureValue::Number(0.0)));
        assert_eq!(vector.get(1), Some(&FeatureValue::Category("0".to_string())));
        assert_eq!(vector.get(6), Some(&FeatureValue::Number(0.0)));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let empty = FeatureVector::from_map(&schema(), &FeatureMap::new()).unwrap();
        let bogus = FeatureVector::from_map(&schema(), &map(json!({"bogus_key": 1}))).unwrap();
        assert_eq!(empty, bogus);
    }

    #[test]
    fn test_omitted_equals_zero() {
        let omitted = FeatureVector::from_map(&schema(), &map(json!({"Fever": 1}))).unwrap();
        let zeroed = FeatureVector::from_map(&schema(), &map(json!({"Fever": 1, "Age": 0, "Sex": 0}))).unwrap();
        assert_eq!(omitted, zeroed);
    }

    #[test]
    fn test_coercions() {
        let vector = FeatureVector::from_map(
            &schema(),
            &map(json!({"Age": "42", "Sex": "Male", "Fever": true, "Cough": null})),
        )
        .unwrap();
        assert_eq!(vector.get(0), Some(&FeatureValue::Number(42.0)));
        assert_eq!(vector.get(1).and_then(|v| v.as_category()), Some("Male"));
        assert_eq!(vector.get(5), Some(&FeatureValue::Number(1.0)));
        assert_eq!(vector.get(6), Some(&FeatureValue::Number(0.0)));
    }

    #[test]
    fn test_type_mismatch_is_error() {
        let result = FeatureVector::from_map(&schema(), &map(json!({"Age": "forty"})));
        assert!(matches!(result, Err(TriageError::InvalidInput(_))));

        let result = FeatureVector::from_map(&schema(), &map(json!({"Sex": ["Male"]})));
        assert!(matches!(result, Err(TriageError::InvalidInput(_))));
    }

    #[test]
    fn test_new_checks_length() {
        let result = FeatureVector::new(&schema(), vec![FeatureValue::Number(1.0)]);
        assert!(matches!(result, Err(TriageError::ShapeError { .. })));
    }
}
