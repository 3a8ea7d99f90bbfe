//! Classification metrics

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Accuracy plus support-weighted precision, recall and F1
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision_weighted: f64,
    pub recall_weighted: f64,
    pub f1_weighted: f64,
}

/// Per-class row of a classification report
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class metrics keyed by label, plus accuracy and averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    #[serde(flatten)]
    pub classes: BTreeMap<String, ClassMetrics>,
    pub accuracy: f64,
    #[serde(rename = "macro avg")]
    pub macro_avg: ClassMetrics,
    #[serde(rename = "weighted avg")]
    pub weighted_avg: ClassMetrics,
}

fn divide(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Per-label metrics over the union of true and predicted labels.
/// Undefined ratios (zero denominators) are 0.
fn per_class<S: AsRef<str>>(y_true: &[S], y_pred: &[S]) -> BTreeMap<String, ClassMetrics> {
    let labels: BTreeSet<&str> = y_true
        .iter()
        .chain(y_pred.iter())
        .map(|s| s.as_ref())
        .collect();

    labels
        .into_iter()
        .map(|label| {
            let mut tp = 0usize;
            let mut fp = 0usize;
            let mut fn_ = 0usize;
            for (t, p) in y_true.iter().zip(y_pred) {
                let (t, p) = (t.as_ref() == label, p.as_ref() == label);
                match (t, p) {
                    (true, true) => tp += 1,
                    (false, true) => fp += 1,
                    (true, false) => fn_ += 1,
                    (false, false) => {}
                }
            }
            let precision = divide(tp as f64, (tp + fp) as f64);
            let recall = divide(tp as f64, (tp + fn_) as f64);
            let f1_score = divide(2.0 * precision * recall, precision + recall);
            (
                label.to_string(),
                ClassMetrics {
                    precision,
                    recall,
                    f1_score,
                    support: tp + fn_,
                },
            )
        })
        .collect()
}

fn accuracy<S: AsRef<str>>(y_true: &[S], y_pred: &[S]) -> f64 {
    let correct = y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, p)| t.as_ref() == p.as_ref())
        .count();
    divide(correct as f64, y_true.len() as f64)
}

fn averages(classes: &BTreeMap<String, ClassMetrics>) -> (ClassMetrics, ClassMetrics) {
    let n_labels = classes.len() as f64;
    let total: usize = classes.values().map(|c| c.support).sum();

    let mut macro_avg = ClassMetrics { support: total, ..Default::default() };
    let mut weighted_avg = ClassMetrics { support: total, ..Default::default() };
    for c in classes.values() {
        macro_avg.precision += divide(c.precision, n_labels);
        macro_avg.recall += divide(c.recall, n_labels);
        macro_avg.f1_score += divide(c.f1_score, n_labels);

        let w = divide(c.support as f64, total as f64);
        weighted_avg.precision += w * c.precision;
        weighted_avg.recall += w * c.recall;
        weighted_avg.f1_score += w * c.f1_score;
    }
    (macro_avg, weighted_avg)
}

impl ModelMetrics {
    /// Compute metrics for paired label sequences
    pub fn compute<S: AsRef<str>>(y_true: &[S], y_pred: &[S]) -> Self {
        let classes = per_class(y_true, y_pred);
        let (_, weighted) = averages(&classes);
        Self {
            accuracy: accuracy(y_true, y_pred),
            precision_weighted: weighted.precision,
            recall_weighted: weighted.recall,
            f1_weighted: weighted.f1_score,
        }
    }
}

impl ClassificationReport {
    pub fn compute<S: AsRef<str>>(y_true: &[S], y_pred: &[S]) -> Self {
        let classes = per_class(y_true, y_pred);
        let (macro_avg, weighted_avg) = averages(&classes);
        Self {
            accuracy: accuracy(y_true, y_pred),
            classes,
            macro_avg,
            weighted_avg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let y = ["Flu", "Anemia", "Flu"];
        let m = ModelMetrics::compute(&y, &y);
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.precision_weighted, 1.0);
        assert_eq!(m.recall_weighted, 1.0);
        assert_eq!(m.f1_weighted, 1.0);
    }

    #[test]
    fn test_zero_division_is_zero() {
        // "Anemia" is never predicted: its precision is undefined and counts as 0
        let y_true = ["Flu", "Anemia"];
        let y_pred = ["Flu", "Flu"];
        let m = ModelMetrics::compute(&y_true, &y_pred);
        assert_eq!(m.accuracy, 0.5);
        assert!((m.precision_weighted - 0.25).abs() < 1e-12);
        assert!((m.recall_weighted - 0.5).abs() < 1e-12);
        assert!(m.f1_weighted.is_finite());
    }

    #[test]
    fn test_empty_input() {
        let empty: [&str; 0] = [];
        let m = ModelMetrics::compute(&empty, &empty);
        assert_eq!(m, ModelMetrics::default());
    }

    #[test]
    fn test_report_shape() {
        let y_true = ["Flu", "Anemia", "Flu", "Dengue"];
        let y_pred = ["Flu", "Flu", "Flu", "Dengue"];
        let report = ClassificationReport::compute(&y_true, &y_pred);

        assert_eq!(report.classes.len(), 3);
        assert_eq!(report.classes["Flu"].support, 2);
        assert_eq!(report.weighted_avg.support, 4);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("macro avg").is_some());
        assert!(json.get("weighted avg").is_some());
        assert!(json["Flu"].get("f1-score").is_some());
        assert_eq!(json["accuracy"], 0.75);
    }
}
