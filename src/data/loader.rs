//! CSV loading

use crate::error::{Result, TriageError};
use polars::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Loads tabular data files into polars frames
pub struct DataLoader {
    /// Rows scanned to infer column dtypes
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
        }
    }

    /// Load a CSV file with a header row
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        if !path.exists() {
            return Err(TriageError::DataError(format!(
                "dataset not found: {}",
                path.display()
            )));
        }

        let start = Instant::now();
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded dataset"
        );
        Ok(df)
    }
}

/// Writes tabular reports
pub struct DataSaver;

impl DataSaver {
    /// Save a frame to CSV, replacing any existing file
    pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| TriageError::DataError(e.to_string()))
    }
}
