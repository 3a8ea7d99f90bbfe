//! Application state shared across handlers

use crate::error::Result;
use crate::inference::InferenceEngine;
use crate::intake::SymptomParser;

/// Read-only after startup; handlers share it through an `Arc` without locks
pub struct AppState {
    pub engine: InferenceEngine,
    pub intake: SymptomParser,
}

impl AppState {
    pub fn new(engine: InferenceEngine) -> Result<Self> {
        Ok(Self {
            engine,
            intake: SymptomParser::new()?,
        })
    }
}
