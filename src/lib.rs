//! triage-ml - symptom-based disease classification
//!
//! Trains a random forest that predicts a disease label from patient
//! demographics and symptom indicators, serves it over HTTP, explains its
//! predictions and audits it per demographic slice.
//!
//! # Modules
//!
//! ## Data and features
//! - [`schema`] - Feature schema derivation and raw feature vectors
//! - [`data`] - CSV loading into typed patient records
//! - [`preprocessing`] - Standard scaling and one-hot encoding
//!
//! ## Model
//! - [`training`] - Stratified split, random forest and evaluation
//! - [`model`] - Fitted pipeline and persisted bundle
//! - [`inference`] - Prediction engine over a loaded bundle
//! - [`explainability`] - Shapley sampling with importance fallbacks
//! - [`fairness`] - Per-slice held-out metrics
//!
//! ## Services
//! - [`intake`] - Symptom form to feature map
//! - [`advice`] - Care advice catalog
//! - [`server`] - HTTP API
//! - [`cli`] - Command-line interface

pub mod error;
pub mod config;

pub mod schema;
pub mod data;
pub mod preprocessing;

pub mod training;
pub mod model;
pub mod inference;
pub mod explainability;
pub mod fairness;

pub mod intake;
pub mod advice;
pub mod server;
pub mod cli;

#[cfg(test)]
mod test_support;

pub use error::{Result, TriageError};
pub use config::ArtifactPaths;
pub use model::ModelBundle;
