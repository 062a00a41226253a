// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - Inference Cache Benchmarks
// ─────────────────────────────────────────────────────────────────────
//! Criterion benchmarks for the one-time warmup and the cached read
//! path that every later request takes.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use creditrisk_core::explanation::BaseValues;
use creditrisk_core::{
    CustomerTable, ExplanationArtifact, ExplanationStore, InferenceService, LogisticModel,
    PredictionCache, StandardTransform,
};

const N_CUSTOMERS: usize = 10_000;

const MODEL: &str = r#"{
    "input_schema": ["EXT_SOURCE_2", "EXT_SOURCE_3", "DAYS_EMPLOYED", "OWN_CAR_AGE",
                     "DAYS_EMPLOYED_PERC", "PAYMENT_RATE"],
    "metadata": {"optimal_threshold": 0.48},
    "intercept": -0.4,
    "coefficients": [-1.2, -1.6, 0.3, 0.1, 0.5, 0.8],
    "impute": [0.5, 0.5, -2000.0, 9.0, 0.1, 0.05],
    "center": [0.5, 0.5, -2000.0, 9.0, 0.1, 0.05],
    "scale": [0.2, 0.2, 2000.0, 8.0, 0.1, 0.02]
}"#;

fn synthetic_table() -> CustomerTable {
    let columns: Vec<String> = [
        "EXT_SOURCE_2",
        "EXT_SOURCE_3",
        "DAYS_BIRTH",
        "DAYS_EMPLOYED",
        "OWN_CAR_AGE",
        "AMT_ANNUITY",
        "AMT_CREDIT",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let rows = (0..N_CUSTOMERS)
        .map(|i| {
            let f = i as f64;
            let days_employed = if i % 17 == 0 { 365243.0 } else { -(f % 5000.0) };
            let own_car_age = if i % 3 == 0 { None } else { Some(f % 20.0) };
            (
                100_000 + i as i64,
                vec![
                    Some((f * 0.37) % 1.0),
                    Some((f * 0.61) % 1.0),
                    Some(-10_000.0 - f % 10_000.0),
                    Some(days_employed),
                    own_car_age,
                    Some(1_000.0 + f % 3_000.0),
                    Some(20_000.0 + f % 50_000.0),
                ],
            )
        })
        .collect();
    CustomerTable::from_rows(columns, rows).expect("synthetic table")
}

fn synthetic_explanations(table: &CustomerTable) -> ExplanationStore {
    let artifact = ExplanationArtifact {
        base_values: BaseValues::Shared(Some(-1.1)),
        values: (0..table.len()).map(|i| vec![Some(i as f64 * 1e-4); 2]).collect(),
        feature_names: vec!["EXT_SOURCE_3".into(), "EXT_SOURCE_2".into()],
    };
    ExplanationStore::from_artifact(artifact, table.ids()).expect("synthetic explanations")
}

fn service() -> InferenceService {
    let table = synthetic_table();
    let explanations = synthetic_explanations(&table);
    InferenceService::from_parts(
        Arc::new(LogisticModel::from_json(MODEL, 0.5).expect("model")),
        Arc::new(StandardTransform::default()),
        table,
        explanations,
        365243.0,
    )
}

// ── Warmup (transform + predict + decide) ───────────────────────────

fn bench_warmup_build(c: &mut Criterion) {
    let table = synthetic_table();
    let model = LogisticModel::from_json(MODEL, 0.5).expect("model");
    let transform = StandardTransform::default();
    c.bench_function("warmup_build_10k", |b| {
        b.iter(|| {
            PredictionCache::build(black_box(&table), &model, &transform, 365243.0)
                .expect("build")
        })
    });
}

// ── Cached reads ────────────────────────────────────────────────────

fn bench_cached_score(c: &mut Criterion) {
    let svc = service();
    svc.warmup().expect("warmup");
    c.bench_function("get_score_cached", |b| {
        b.iter(|| svc.get_score(black_box(105_000)).expect("score"))
    });
}

fn bench_cached_dashboard(c: &mut Criterion) {
    let svc = service();
    svc.warmup().expect("warmup");
    c.bench_function("get_dashboard_cached", |b| {
        b.iter(|| svc.get_dashboard(black_box(105_000)).expect("dashboard"))
    });
}

fn bench_bivariate(c: &mut Criterion) {
    let svc = service();
    svc.warmup().expect("warmup");
    c.bench_function("get_bivariate_10k", |b| {
        b.iter(|| {
            svc.get_bivariate(black_box("EXT_SOURCE_3"), black_box("OWN_CAR_AGE"))
                .expect("bivariate")
        })
    });
}

criterion_group!(
    benches,
    bench_warmup_build,
    bench_cached_score,
    bench_cached_dashboard,
    bench_bivariate,
);
criterion_main!(benches);
