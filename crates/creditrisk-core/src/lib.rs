// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - Inference Cache Core
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Inference cache for the credit-risk dashboard: loads a scoring
//! model, a customer table and pre-computed explanations once, then
//! serves per-customer and cross-customer queries from a prediction
//! table materialized on first use.
//!
//! # Invariants
//!
//! 1. **Construction predicts nothing**: loading only reads artifacts.
//!    The first prediction-backed query triggers the warmup.
//!
//! 2. **One warmup per process**: concurrent first-access callers are
//!    serialized behind a single-flight gate and all observe the same
//!    published table. A failed warmup publishes nothing.
//!
//! 3. **Explanations are aligned by load order**: artifact row `i`
//!    belongs to the `i`-th customer of the CSV, resolved once into an
//!    id-keyed map at construction.
//!
//! 4. **Missing is explicit**: NaN never leaves the core. Display and
//!    bivariate values are `Option<f64>` or filtered out.

pub mod assets;
pub mod cache;
pub mod dataset;
pub mod explanation;
pub mod model;
pub mod service;
pub mod transform;

pub use assets::{AssetLayout, AssetPaths, OptionalAssets};
pub use cache::{CachedPrediction, PredictionCache, WarmupGate};
pub use dataset::CustomerTable;
pub use explanation::{ExplanationArtifact, ExplanationStore};
pub use model::{ExternalModel, FeatureMatrix, LogisticModel, ScoringModel};
pub use service::InferenceService;
pub use transform::{ExternalTransform, FeatureTransform, StandardTransform};
