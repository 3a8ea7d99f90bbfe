//! Training configuration

use super::random_forest::{ClassWeight, MaxFeatures};
use crate::schema::SchemaDeclaration;
use serde::{Deserialize, Serialize};

/// Configuration for a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Column conventions used to derive the schema
    pub declaration: SchemaDeclaration,

    /// Fraction of each class held out for evaluation
    pub test_size: f64,

    /// Seed for the split, the forest and the background sample
    pub random_state: u64,

    // Forest parameters
    /// Number of trees
    pub n_estimators: usize,

    /// Maximum depth of trees
    pub max_depth: Option<usize>,

    /// Minimum samples to split a node
    pub min_samples_split: usize,

    /// Minimum samples per leaf
    pub min_samples_leaf: usize,

    /// Features drawn per split
    pub max_features: MaxFeatures,

    /// Bootstrap rows per tree
    pub bootstrap: bool,

    /// Class weighting
    pub class_weight: ClassWeight,

    /// Transformed training rows kept in the bundle as attribution background
    pub background_size: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            declaration: SchemaDeclaration::default(),
            test_size: 0.2,
            random_state: 42,
            n_estimators: 600,
            max_depth: Some(18),
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            class_weight: ClassWeight::Balanced,
            background_size: 200,
        }
    }
}

impl TrainingConfig {
    pub fn with_declaration(mut self, declaration: SchemaDeclaration) -> Self {
        self.declaration = declaration;
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_background_size(mut self, size: usize) -> Self {
        self.background_size = size;
        self
    }
}
