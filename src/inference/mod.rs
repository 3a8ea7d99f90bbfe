//! Inference
//!
//! Loads a persisted bundle once and answers health, schema and prediction
//! queries from it.

mod engine;

pub use engine::{HealthStatus, InferenceEngine, Prediction, SchemaInfo};
