//! Artifact locations shared by the batch jobs and the server

use std::path::PathBuf;

/// Paths of every file the system reads or writes.
///
/// Each artifact is overwritten whole; nothing is appended or merged.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    /// Training dataset (CSV with header)
    pub data: PathBuf,
    /// Persisted model bundle
    pub model: PathBuf,
    /// Training metrics JSON
    pub training_report: PathBuf,
    /// Global explanation JSON
    pub global_explanation: PathBuf,
    /// Fairness report CSV
    pub fairness_report: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            data: env_path("DATA_PATH", "dataset/realistic_symptom_disease_dataset.csv"),
            model: env_path("MODEL_PATH", "model.bin"),
            training_report: env_path("TRAINING_REPORT_PATH", "training_report.json"),
            global_explanation: env_path("GLOBAL_EXPLAIN_PATH", "global_explain.json"),
            fairness_report: env_path("FAIRNESS_REPORT_PATH", "fairness_report.csv"),
        }
    }
}

impl ArtifactPaths {
    /// Place every output artifact under `dir`, keeping the default file names
    pub fn in_dir(dir: impl Into<PathBuf>, data: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            data: data.into(),
            model: dir.join("model.bin"),
            training_report: dir.join("training_report.json"),
            global_explanation: dir.join("global_explain.json"),
            fairness_report: dir.join("fairness_report.csv"),
        }
    }

    pub fn with_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.data = path.into();
        self
    }

    pub fn with_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.model = path.into();
        self
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir() {
        let paths = ArtifactPaths::in_dir("/tmp/out", "data.csv");
        assert_eq!(paths.model, PathBuf::from("/tmp/out/model.bin"));
        assert_eq!(paths.fairness_report, PathBuf::from("/tmp/out/fairness_report.csv"));
        assert_eq!(paths.data, PathBuf::from("data.csv"));
    }
}
