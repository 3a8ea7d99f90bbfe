//! Data preprocessing
//!
//! - Standard scaling of numeric columns
//! - One-hot encoding of categorical columns (unknown categories encode as zeros)
//! - Passthrough of symptom indicators

mod encoder;
mod pipeline;
mod scaler;

pub use encoder::OneHotEncoder;
pub use pipeline::Preprocessor;
pub use scaler::StandardScaler;
