//! Benchmarks for the per-frame analysis pipeline.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use repform_core::{BodyPart, Landmark, LandmarkSet, Point3D, Result};
use repform_engine::catalog;
use repform_engine::{
    Classifier, ClassifierStore, FormEngine, LandmarkJsonDetector, LinearClassifier, Phase,
    ProfileRegistry,
};

struct Constant(usize);

impl Classifier for Constant {
    fn input_len(&self) -> usize {
        self.0
    }

    fn predict(&self, _features: &[f64]) -> Result<usize> {
        Ok(0)
    }
}

fn create_test_pose() -> LandmarkSet {
    LandmarkSet::new(BodyPart::ALL.iter().enumerate().map(|(i, part)| {
        let t = i as f64 * 0.37;
        Landmark::new(
            *part,
            Point3D::new(0.5 + 0.2 * t.cos(), 0.1 + 0.025 * i as f64, 0.05 * t.sin()),
            0.95,
        )
    }))
}

fn create_engine() -> FormEngine {
    let classifiers = ClassifierStore::new()
        .with("plank", Arc::new(Constant(27)))
        .with("bicep-curl", Arc::new(Constant(18)))
        .with("lunge", Arc::new(Constant(18)));

    FormEngine::new(
        Arc::new(LandmarkJsonDetector),
        Arc::new(ProfileRegistry::builtin().unwrap()),
        Arc::new(classifiers),
    )
    .unwrap()
}

fn benchmark_analysis(c: &mut Criterion) {
    let engine = create_engine();
    let pose = create_test_pose();

    for id in [catalog::BICEP_CURL, catalog::CABLE_CROSSOVER, catalog::BENCH_PRESS] {
        c.bench_function(&format!("analyze_{id}"), |b| {
            b.iter(|| engine.analyze_landmarks(black_box(&pose), id, Phase::AwaitingInitial))
        });
    }
}

fn benchmark_detection(c: &mut Criterion) {
    let engine = create_engine();
    let frame = serde_json::to_vec(
        &create_test_pose()
            .iter()
            .map(|lm| {
                serde_json::json!({
                    "x": lm.position.x,
                    "y": lm.position.y,
                    "z": lm.position.z,
                    "visibility": lm.visibility,
                })
            })
            .collect::<Vec<_>>(),
    )
    .unwrap();

    c.bench_function("detect_landmark_json", |b| {
        b.iter(|| engine.detect(black_box(&frame)))
    });
}

fn benchmark_linear_classifier(c: &mut Criterion) {
    let weights: Vec<Vec<f64>> = (0..3)
        .map(|k| (0..27).map(|i| ((k * 27 + i) as f64 * 0.1).sin()).collect())
        .collect();
    let json = serde_json::json!({ "weights": weights, "bias": [0.1, -0.2, 0.05] }).to_string();
    let classifier = LinearClassifier::from_json(&json).unwrap();

    let features: Vec<f64> = (0..27).map(|i| i as f64 * 0.01).collect();

    c.bench_function("linear_predict_27", |b| {
        b.iter(|| classifier.predict(black_box(&features)))
    });
}

criterion_group!(
    benches,
    benchmark_analysis,
    benchmark_detection,
    benchmark_linear_classifier
);
criterion_main!(benches);
