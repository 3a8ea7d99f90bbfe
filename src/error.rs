//! Error types for the triage pipeline

use thiserror::Error;

/// Result type alias for triage operations
pub type Result<T> = std::result::Result<T, TriageError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Explanation error: {0}")]
    ExplanationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<polars::error::PolarsError> for TriageError {
    fn from(err: polars::error::PolarsError) -> Self {
        TriageError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for TriageError {
    fn from(err: serde_json::Error) -> Self {
        TriageError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for TriageError {
    fn from(err: bincode::Error) -> Self {
        TriageError::SerializationError(err.to_string())
    }
}

impl From<regex::Error> for TriageError {
    fn from(err: regex::Error) -> Self {
        TriageError::InvalidInput(err.to_string())
    }
}

impl From<ndarray::ShapeError> for TriageError {
    fn from(err: ndarray::ShapeError) -> Self {
        TriageError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
