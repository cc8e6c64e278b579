//! Benchmarks for the single-record prediction path.

#![allow(clippy::unwrap_used)]

use churn_core::{
    explain, Activation, ChurnAssets, CustomerRecord, DenseLayer, FeatureScaler, LabelEncoder,
    Network, OneHotEncoder, Predictor, ScalingMethod,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// 12 -> 64 -> 32 -> 1, the shape of the production classifier.
fn production_shaped_assets() -> ChurnAssets {
    let dense = |units: usize, inputs: usize, activation| {
        DenseLayer::new(
            (0..units)
                .map(|u| (0..inputs).map(|i| ((u + i) % 5) as f64 * 0.05 - 0.1).collect())
                .collect(),
            vec![0.01; units],
            activation,
        )
    };
    ChurnAssets {
        model: Network::new(vec![
            dense(64, 12, Activation::Relu),
            dense(32, 64, Activation::Relu),
            dense(1, 32, Activation::Sigmoid),
        ])
        .unwrap(),
        gender_encoder: LabelEncoder::new(vec!["Female".into(), "Male".into()]).unwrap(),
        geography_encoder: OneHotEncoder::new(
            "Geography",
            vec!["France".into(), "Germany".into(), "Spain".into()],
        )
        .unwrap(),
        scaler: FeatureScaler::new(
            ScalingMethod::Standard {
                mean: vec![650.0, 0.5, 39.0, 5.0, 76000.0, 1.5, 0.7, 0.5, 100000.0, 0.5, 0.25, 0.25],
                scale: vec![97.0, 0.5, 10.5, 2.9, 62000.0, 0.6, 0.46, 0.5, 57500.0, 0.5, 0.43, 0.43],
            },
            None,
        )
        .unwrap(),
    }
}

fn record() -> CustomerRecord {
    CustomerRecord {
        credit_score: 650,
        gender: "Female".into(),
        age: 35,
        tenure: 5,
        balance: 50000.0,
        num_of_products: 2,
        has_credit_card: true,
        is_active_member: true,
        estimated_salary: 50000.0,
        geography: "France".into(),
    }
}

fn bench_predict(c: &mut Criterion) {
    let predictor = Predictor::new(production_shaped_assets()).unwrap();
    let record = record();

    c.bench_function("assemble", |b| {
        let assets = predictor.assets();
        b.iter(|| assets.assembler().assemble(black_box(&record)))
    });
    c.bench_function("predict", |b| b.iter(|| predictor.predict(black_box(&record))));
    c.bench_function("explain", |b| b.iter(|| explain(&predictor, black_box(&record))));
}

criterion_group!(benches, bench_predict);
criterion_main!(benches);
