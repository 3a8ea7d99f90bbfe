use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use triage_ml::explainability::ShapleySampler;
use triage_ml::training::RandomForest;

/// One-hot-like features where the label is carried by the first few columns
fn create_classification_data(n_rows: usize, n_features: usize, n_classes: usize) -> (Array2<f64>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let y: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_classes)).collect();
    let x = Array2::from_shape_fn((n_rows, n_features), |(i, j)| {
        if j < n_classes {
            f64::from(u8::from(y[i] == j))
        } else {
            rng.gen::<f64>()
        }
    });
    (x, y)
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10);

    for n_rows in [1000, 5000].iter() {
        let (x, y) = create_classification_data(*n_rows, 20, 5);

        group.bench_with_input(BenchmarkId::new("fit", n_rows), &(x, y), |b, (x, y)| {
            b.iter(|| {
                let mut forest = RandomForest::new(100).with_max_depth(Some(18)).with_random_state(42);
                forest.fit(black_box(x), y, 5).unwrap();
                forest
            })
        });
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    let (x_train, y_train) = create_classification_data(5000, 20, 5);
    let mut forest = RandomForest::new(100).with_max_depth(Some(18)).with_random_state(42);
    forest.fit(&x_train, &y_train, 5).unwrap();

    for n_rows in [1, 100, 1000].iter() {
        let (x, _) = create_classification_data(*n_rows, 20, 5);
        group.bench_with_input(BenchmarkId::new("predict_proba", n_rows), &x, |b, x| {
            b.iter(|| forest.predict_proba(black_box(x)).unwrap())
        });
    }

    let background = x_train.slice(ndarray::s![..200, ..]).to_owned();
    let (row, _) = create_classification_data(1, 20, 5);
    let sampler = ShapleySampler::new(&background).with_n_permutations(10);
    group.bench_function("shapley_single_row", |b| {
        b.iter(|| sampler.explain(|rows| forest.predict_proba(rows), black_box(&row)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction);
criterion_main!(benches);
