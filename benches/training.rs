use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use delivery_eta::features::{FeatureBuilder, FeatureFrame, TARGET_COLUMN};
use delivery_eta::training::{TrainingConfig, TrainingPipeline};
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_delivery_data(n_rows: usize) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let cities = ["Urban", "Metropolitian", "Semi-Urban"];
    let weather = ["Sunny", "Fog", "Stormy", "Cloudy", "Windy"];

    let dist: Vec<f64> = (0..n_rows).map(|_| rng.gen::<f64>() * 20.0).collect();
    let age: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(20.0..40.0)).collect();
    let hour: Vec<i64> = (0..n_rows).map(|_| rng.gen_range(8..23)).collect();
    let city: Vec<&str> = (0..n_rows).map(|_| *cities.choose(&mut rng).unwrap()).collect();
    let conditions: Vec<&str> = (0..n_rows).map(|_| *weather.choose(&mut rng).unwrap()).collect();

    // Target as a linear function of distance and hour plus noise
    let target: Vec<f64> = dist
        .iter()
        .zip(hour.iter())
        .map(|(d, h)| 5.0 * d + 0.5 * *h as f64 + rng.gen::<f64>())
        .collect();

    df!(
        "dist_km" => dist,
        "delivery_person_age" => age,
        "order_hour" => hour,
        "city" => city,
        "weather_conditions" => conditions,
        TARGET_COLUMN => target,
    )
    .unwrap()
}

fn derived(n_rows: usize) -> FeatureFrame {
    FeatureBuilder::new().derive(&create_delivery_data(n_rows)).unwrap()
}

fn bench_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("derivation");

    for n_rows in [1000, 10000].iter() {
        let df = create_delivery_data(*n_rows);
        group.bench_with_input(BenchmarkId::new("derive", n_rows), &df, |b, df| {
            let builder = FeatureBuilder::new();
            b.iter(|| builder.derive(black_box(df)).unwrap())
        });
    }

    group.finish();
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10); // Fewer samples for training benchmarks

    for n_rows in [500, 2000].iter() {
        let frame = derived(*n_rows);
        group.bench_with_input(BenchmarkId::new("fit", n_rows), &frame, |b, frame| {
            let pipeline = TrainingPipeline::new(TrainingConfig::new().with_n_estimators(50));
            b.iter(|| pipeline.train(black_box(frame)).unwrap())
        });
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    // Train pipeline once
    let frame = derived(2000);
    let outcome = TrainingPipeline::new(TrainingConfig::new().with_n_estimators(50))
        .train(&frame)
        .unwrap();

    for n_rows in [100, 1000].iter() {
        let test = derived(*n_rows);
        group.bench_with_input(BenchmarkId::new("predict", n_rows), &test, |b, test| {
            b.iter(|| outcome.pipeline.predict_frame(black_box(test)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_derivation, bench_training, bench_prediction);
criterion_main!(benches);
