//! Model training
//!
//! - Stratified, seeded train/test split
//! - Random forest of Gini decision trees with balanced class weights
//! - Weighted metrics and a per-class report on the held-out split

mod config;
mod engine;
pub mod decision_tree;
pub mod metrics;
pub mod random_forest;
pub mod split;

pub use config::TrainingConfig;
pub use decision_tree::{DecisionTree, TreeNode};
pub use engine::{TrainEngine, TrainingOutcome, TrainingReport};
pub use metrics::{ClassMetrics, ClassificationReport, ModelMetrics};
pub use random_forest::{ClassWeight, MaxFeatures, RandomForest};
pub use split::{stratified_split, SplitIndices};
