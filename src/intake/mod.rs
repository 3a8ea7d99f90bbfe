//! Symptom intake
//!
//! Turns the human-facing intake form (demographics plus a free-text symptom
//! list) into the feature map the inference engine consumes.

use crate::error::Result;
use crate::schema::{FeatureMap, FeatureSchema};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Symptom list as sent by a form: one delimited string or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymptomList {
    Text(String),
    Items(Vec<String>),
}

impl Default for SymptomList {
    fn default() -> Self {
        SymptomList::Items(Vec::new())
    }
}

/// Intake form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymptomForm {
    /// Number or numeric string
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub smoking_history: Option<String>,
    #[serde(default)]
    pub diet_type: Option<String>,
    #[serde(default)]
    pub physical_activity: Option<String>,
    #[serde(default)]
    pub symptoms: SymptomList,
}

/// Splits and normalizes symptom names
#[derive(Debug, Clone)]
pub struct SymptomParser {
    separators: Regex,
    filler: Regex,
}

impl SymptomParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            separators: Regex::new(r"[,;]+|\n+")?,
            filler: Regex::new(r"[\s_]+")?,
        })
    }

    /// `"Chest Pain"`, `"chest_pain"` and `"ChestPain"` all become `"chestpain"`
    pub fn normalize(&self, name: &str) -> String {
        self.filler.replace_all(name, "").to_lowercase()
    }

    /// Normalized, non-empty entries of a symptom list
    pub fn parse(&self, symptoms: &SymptomList) -> HashSet<String> {
        let entries: Vec<&str> = match symptoms {
            SymptomList::Text(text) => self.separators.split(text).collect(),
            SymptomList::Items(items) => items.iter().map(String::as_str).collect(),
        };
        entries
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| self.normalize(s))
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Build the feature map for `schema`.
    ///
    /// Every symptom column is set explicitly, 1 when listed and 0 otherwise.
    /// Listed symptoms unknown to the schema are dropped.
    pub fn to_feature_map(&self, form: &SymptomForm, schema: &FeatureSchema) -> FeatureMap {
        let mut map = FeatureMap::new();

        if let Some(age) = &form.age {
            map.insert("Age".to_string(), age.clone());
        }
        let demographics = [
            ("Sex", &form.sex),
            ("SmokingHistory", &form.smoking_history),
            ("DietType", &form.diet_type),
            ("ExerciseFrequency", &form.physical_activity),
        ];
        for (column, value) in demographics {
            if let Some(value) = value {
                map.insert(column.to_string(), Value::String(value.trim().to_string()));
            }
        }

        let listed = self.parse(&form.symptoms);
        for symptom in &schema.symptoms {
            let present = listed.contains(&self.normalize(symptom));
            map.insert(symptom.clone(), Value::from(u8::from(present)));
        }
        map
    }
}
