//! Integration test: Training building blocks through the public API

use ndarray::Array2;
use std::collections::HashSet;
use triage_ml::training::{
    stratified_split, ClassWeight, ClassificationReport, MaxFeatures, ModelMetrics, RandomForest,
};

fn labels() -> Vec<&'static str> {
    let mut labels = vec!["Flu"; 25];
    labels.extend(vec!["Dengue"; 10]);
    labels.extend(vec!["Anemia"; 5]);
    labels
}

#[test]
fn test_split_is_stratified_and_disjoint() {
    let labels = labels();
    let split = stratified_split(&labels, 0.2, 42).unwrap();

    assert_eq!(split.train.len() + split.test.len(), labels.len());
    let train: HashSet<_> = split.train.iter().collect();
    assert!(split.test.iter().all(|i| !train.contains(i)));

    let held_out = |name: &str| split.test.iter().filter(|&&i| labels[i] == name).count();
    assert_eq!(held_out("Flu"), 5);
    assert_eq!(held_out("Dengue"), 2);
    assert_eq!(held_out("Anemia"), 1);
}

#[test]
fn test_split_reproducible_per_seed() {
    let labels = labels();
    let a = stratified_split(&labels, 0.2, 42).unwrap();
    let b = stratified_split(&labels, 0.2, 42).unwrap();
    let c = stratified_split(&labels, 0.2, 7).unwrap();
    assert_eq!(a, b);
    assert_ne!(a.test, c.test);
}

#[test]
fn test_split_rejects_singleton_class() {
    let labels = ["Flu", "Flu", "Flu", "Gout"];
    assert!(stratified_split(&labels, 0.2, 42).is_err());
}

#[test]
fn test_forest_learns_threshold() {
    let n = 80;
    let x = Array2::from_shape_fn((n, 3), |(i, j)| match j {
        0 => i as f64,
        1 => (i % 7) as f64,
        _ => ((i * 13) % 5) as f64,
    });
    let y: Vec<usize> = (0..n).map(|i| usize::from(i >= n / 2)).collect();

    let mut forest = RandomForest::new(25)
        .with_max_features(MaxFeatures::All)
        .with_class_weight(ClassWeight::Uniform)
        .with_random_state(42);
    forest.fit(&x, &y, 2).unwrap();

    let predictions = forest.predict(&x).unwrap();
    let correct = predictions.iter().zip(&y).filter(|(p, t)| p == t).count();
    assert!(correct as f64 / n as f64 >= 0.95);

    let importances = forest.feature_importances().unwrap();
    assert!(importances[0] > importances[1]);
    assert!(importances[0] > importances[2]);

    let proba = forest.predict_proba(&x).unwrap();
    for row in proba.rows() {
        assert!((row.sum() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_forest_shape_mismatch() {
    let x = Array2::zeros((10, 3));
    let y = vec![0usize; 10];
    let mut forest = RandomForest::new(5).with_random_state(1);
    forest.fit(&x, &y, 1).unwrap();
    assert!(forest.predict_proba(&Array2::zeros((2, 4))).is_err());
}

#[test]
fn test_weighted_metrics() {
    let y_true = ["Flu", "Flu", "Flu", "Anemia"];
    let y_pred = ["Flu", "Flu", "Anemia", "Anemia"];
    let metrics = ModelMetrics::compute(&y_true, &y_pred);
    assert!((metrics.accuracy - 0.75).abs() < 1e-12);
    // Flu: p=1, r=2/3; Anemia: p=1/2, r=1; weights 3/4 and 1/4
    assert!((metrics.precision_weighted - 0.875).abs() < 1e-12);
    assert!((metrics.recall_weighted - 0.75).abs() < 1e-12);

    let report = ClassificationReport::compute(&y_true, &y_pred);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["Flu"]["support"], 3);
    assert_eq!(json["Anemia"]["recall"], 1.0);
    assert!(json["macro avg"]["f1-score"].is_number());
}

#[test]
fn test_metrics_zero_division() {
    let y_true = ["Flu", "Flu"];
    let y_pred = ["Dengue", "Dengue"];
    let metrics = ModelMetrics::compute(&y_true, &y_pred);
    assert_eq!(metrics.accuracy, 0.0);
    assert_eq!(metrics.precision_weighted, 0.0);
    assert_eq!(metrics.f1_weighted, 0.0);
}
