//! Shared fixtures for unit tests

use crate::data::{Dataset, PatientRecord};
use crate::model::ModelBundle;
use crate::schema::{FeatureSchema, FeatureValue, FeatureVector, SchemaDeclaration};
use crate::training::{TrainEngine, TrainingConfig};

/// Three diseases, each driven by one symptom, with default demographics
pub fn patients(n: usize) -> Dataset {
    let columns = [
        "Age",
        "Sex",
        "SmokingHistory",
        "DietType",
        "ExerciseFrequency",
        "Fever",
        "ChestPain",
        "Fatigue",
        "Disease",
    ];
    let schema = FeatureSchema::derive(&columns, &SchemaDeclaration::default()).expect("schema");

    let records = (0..n)
        .map(|i| {
            let (label, symptom) = match i % 3 {
                0 => ("Flu", 0),
                1 => ("Heart Disease", 1),
                _ => ("Anemia", 2),
            };
            let mut values = vec![
                FeatureValue::Number(18.0 + (i * 7 % 60) as f64),
                FeatureValue::Category(if i % 2 == 0 { "Male" } else { "Female" }.to_string()),
                FeatureValue::Category(["Never", "Former", "Current"][(i / 3) % 3].to_string()),
                FeatureValue::Category(["Veg", "Mixed"][i % 2].to_string()),
                FeatureValue::Category(["Daily", "Rarely"][(i / 2) % 2].to_string()),
            ];
            for s in 0..3 {
                values.push(FeatureValue::Number(if s == symptom { 1.0 } else { 0.0 }));
            }
            PatientRecord {
                features: FeatureVector::new(&schema, values).expect("vector"),
                label: label.to_string(),
            }
        })
        .collect();

    Dataset::from_records(schema, records).expect("dataset")
}

/// Small forest trained on [`patients`]
pub fn bundle() -> ModelBundle {
    let config = TrainingConfig::default()
        .with_n_estimators(20)
        .with_background_size(20);
    TrainEngine::new(config)
        .fit(&patients(60))
        .expect("training")
        .bundle
}
