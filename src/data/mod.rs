//! Typed patient dataset
//!
//! Raw CSV frames are converted once, at load time, into [`PatientRecord`]s
//! whose values follow the schema's feature order. Everything downstream
//! works on records and never touches frame columns by name again.

mod loader;

pub use loader::{DataLoader, DataSaver};

use crate::error::{Result, TriageError};
use crate::schema::{ColumnKind, FeatureSchema, FeatureValue, FeatureVector, SchemaDeclaration};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;

/// One labelled row
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    pub features: FeatureVector,
    pub label: String,
}

/// Records plus the schema they were validated against
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: FeatureSchema,
    records: Vec<PatientRecord>,
}

impl Dataset {
    /// Load a CSV file and validate it against the declaration
    pub fn load(path: &Path, declaration: &SchemaDeclaration) -> Result<Self> {
        let df = DataLoader::new().load_csv(path)?;
        Self::from_frame(&df, declaration)
    }

    /// Convert a frame into typed records.
    ///
    /// Column names are whitespace-trimmed before the schema is derived.
    /// Declared columns must exist; numeric and symptom columns must hold
    /// numbers. Missing cells become 0 (numeric) or the empty category.
    pub fn from_frame(df: &DataFrame, declaration: &SchemaDeclaration) -> Result<Self> {
        let raw_names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        let mut by_trimmed: HashMap<String, String> = HashMap::with_capacity(raw_names.len());
        let mut trimmed = Vec::with_capacity(raw_names.len());
        for raw in &raw_names {
            let name = raw.trim().to_string();
            if by_trimmed.insert(name.clone(), raw.clone()).is_some() {
                return Err(TriageError::SchemaError(format!("duplicate column '{}'", name)));
            }
            trimmed.push(name);
        }

        let schema = FeatureSchema::derive(&trimmed, declaration)?;
        let n_rows = df.height();

        let lookup = |name: &str| -> Result<&Column> {
            let raw = by_trimmed
                .get(name)
                .ok_or_else(|| TriageError::FeatureNotFound(name.to_string()))?;
            df.column(raw).map_err(|_| TriageError::FeatureNotFound(name.to_string()))
        };

        let columns: Vec<Vec<FeatureValue>> = schema
            .feature_order()
            .iter()
            .zip(schema.kinds())
            .map(|(name, kind)| {
                let column = lookup(name)?;
                match kind {
                    ColumnKind::Numeric | ColumnKind::Symptom => numeric_values(name, column),
                    ColumnKind::Categorical => categorical_values(column),
                }
            })
            .collect::<Result<_>>()?;

        let labels = string_values(lookup(&schema.target)?)?;
        if let Some(row) = labels.iter().position(|l| l.is_none()) {
            return Err(TriageError::DataError(format!(
                "missing '{}' value at row {}",
                schema.target, row
            )));
        }

        let records = (0..n_rows)
            .map(|row| {
                let values = columns.iter().map(|col| col[row].clone()).collect();
                Ok(PatientRecord {
                    features: FeatureVector::new(&schema, values)?,
                    label: labels[row].clone().unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { schema, records })
    }

    /// Build directly from records, e.g. for synthetic data
    pub fn from_records(schema: FeatureSchema, records: Vec<PatientRecord>) -> Result<Self> {
        if let Some(bad) = records.iter().find(|r| r.features.len() != schema.n_features()) {
            return Err(TriageError::ShapeError {
                expected: format!("{} features", schema.n_features()),
                actual: format!("{} features", bad.features.len()),
            });
        }
        Ok(Self { schema, records })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.records.iter().map(|r| r.label.clone()).collect()
    }

    pub fn vectors(&self) -> Vec<FeatureVector> {
        self.records.iter().map(|r| r.features.clone()).collect()
    }

    /// Records at the given positions, in the given order
    pub fn select(&self, indices: &[usize]) -> Vec<PatientRecord> {
        indices.iter().filter_map(|&i| self.records.get(i).cloned()).collect()
    }
}

fn numeric_values(name: &str, column: &Column) -> Result<Vec<FeatureValue>> {
    let nulls_before = column.null_count();
    let cast = column.cast(&DataType::Float64)?;
    if cast.null_count() > nulls_before {
        return Err(TriageError::SchemaError(format!(
            "column '{}' contains non-numeric values",
            name
        )));
    }
    let values = cast
        .f64()?
        .into_iter()
        .map(|v| FeatureValue::Number(v.unwrap_or(0.0)))
        .collect();
    Ok(values)
}

fn categorical_values(column: &Column) -> Result<Vec<FeatureValue>> {
    Ok(string_values(column)?
        .into_iter()
        .map(|v| FeatureValue::Category(v.unwrap_or_default()))
        .collect())
}

fn string_values(column: &Column) -> Result<Vec<Option<String>>> {
    let cast = column.cast(&DataType::String)?;
    let values = cast
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()))
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df!(
            " Age " => &[25i64, 40, 70],
            "Sex" => &["Male", "Female", "Male"],
            "SmokingHistory" => &["Never", "Former", "Current"],
            "DietType" => &["Veg", "Mixed", "Mixed"],
            "ExerciseFrequency" => &["Daily", "Rarely", "Never"],
            "Fever" => &[1i64, 0, 1],
            "Disease " => &["Flu", "Anemia", "Flu"],
            "Cough" => &[1i64, 0, 0]
        )
        .unwrap()
    }

    #[test]
    fn test_from_frame_trims_and_types() {
        let dataset = Dataset::from_frame(&frame(), &SchemaDeclaration::default()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.schema().target, "Disease");
        assert_eq!(dataset.schema().symptoms, vec!["Fever", "Cough"]);

        let first = &dataset.records()[0];
        assert_eq!(first.label, "Flu");
        assert_eq!(first.features.get(0), Some(&FeatureValue::Number(25.0)));
        assert_eq!(first.features.get(1), Some(&FeatureValue::Category("Male".to_string())));
        assert_eq!(first.features.get(6), Some(&FeatureValue::Number(1.0)));
    }

    #[test]
    fn test_missing_declared_column() {
        let df = df!(
            "Age" => &[25i64],
            "Disease" => &["Flu"]
        )
        .unwrap();
        let result = Dataset::from_frame(&df, &SchemaDeclaration::default());
        assert!(matches!(result, Err(TriageError::FeatureNotFound(_))));
    }

    #[test]
    fn test_non_numeric_symptom_rejected() {
        let df = df!(
            "Age" => &[25i64],
            "Fever" => &["yes"],
            "Disease" => &["Flu"]
        )
        .unwrap();
        let decl = SchemaDeclaration::new("Disease").with_numeric(["Age"]);
        let result = Dataset::from_frame(&df, &decl);
        assert!(matches!(result, Err(TriageError::SchemaError(_))));
    }

    #[test]
    fn test_select_preserves_order() {
        let dataset = Dataset::from_frame(&frame(), &SchemaDeclaration::default()).unwrap();
        let picked = dataset.select(&[2, 0]);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].features.get(0), Some(&FeatureValue::Number(70.0)));
    }
}
