// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - Prediction Cache + Warmup Gate
// ─────────────────────────────────────────────────────────────────────
//! Memoized, full materialization of predictions for every customer.
//!
//! # Invariants
//!
//! 1. **Single flight**: at most one build runs at a time. Concurrent
//!    first-access callers block on the warmup mutex and then read the
//!    result the winner published.
//!
//! 2. **All or nothing**: the cache is published only after a complete
//!    build. A failed build publishes nothing and the gate stays
//!    `Empty`, so the next query retries.
//!
//! 3. **Ready is terminal**: once published, the cache is never rebuilt
//!    or invalidated, and reads go through a `OnceLock` without locking.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use parking_lot::Mutex;

use creditrisk_types::{
    BivariateData, CacheColumn, CacheState, CustomerId, DashboardFeature, Decision, MainFeatures,
    RiskError, RiskResult, ScoreView,
};

use crate::dataset::CustomerTable;
use crate::model::ScoringModel;
use crate::transform::FeatureTransform;

/// One customer's cached row.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPrediction {
    pub features: MainFeatures,
    pub probability_pos: f64,
    pub probability_neg: f64,
    pub threshold: f64,
    pub decision: Decision,
}

impl CachedPrediction {
    pub fn score(&self) -> ScoreView {
        ScoreView {
            probability_pos: self.probability_pos,
            threshold: self.threshold,
            decision: self.decision,
        }
    }

    fn column(&self, column: CacheColumn) -> Option<f64> {
        match column {
            CacheColumn::Feature(f) => self.features.get(f),
            CacheColumn::ProbabilityPos => Some(self.probability_pos),
            CacheColumn::ProbabilityNeg => Some(self.probability_neg),
            CacheColumn::Threshold => Some(self.threshold),
        }
    }
}

/// Id-keyed prediction table plus the load order it was built from.
#[derive(Debug, Clone, Default)]
pub struct PredictionCache {
    order: Vec<CustomerId>,
    rows: HashMap<CustomerId, CachedPrediction>,
}

impl PredictionCache {
    /// Run transform → predict → decide for the whole table.
    pub fn build(
        table: &CustomerTable,
        model: &dyn ScoringModel,
        transform: &dyn FeatureTransform,
        days_employed_sentinel: f64,
    ) -> RiskResult<Self> {
        let matrix = transform.transform(table, model.expected_features())?;
        if matrix.n_rows() != table.len() {
            return Err(RiskError::Transform(format!(
                "transform produced {} rows for {} customers",
                matrix.n_rows(),
                table.len()
            )));
        }

        let predictions = model.predict(&matrix)?;
        if predictions.len() != table.len() {
            return Err(RiskError::Prediction(format!(
                "model returned {} predictions for {} customers",
                predictions.len(),
                table.len()
            )));
        }

        let threshold = model.threshold();
        let mut rows = HashMap::with_capacity(table.len());
        for (position, (&id, [prob_neg, prob_pos])) in
            table.ids().iter().zip(predictions).enumerate()
        {
            if !prob_pos.is_finite() || !prob_neg.is_finite() {
                return Err(RiskError::Prediction(format!(
                    "non-finite probability for customer {id}"
                )));
            }
            rows.insert(
                id,
                CachedPrediction {
                    features: display_features(table, position, days_employed_sentinel),
                    probability_pos: prob_pos,
                    probability_neg: prob_neg,
                    threshold,
                    decision: Decision::from_probability(prob_pos, threshold),
                },
            );
        }

        Ok(Self {
            order: table.ids().to_vec(),
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: CustomerId) -> Option<&CachedPrediction> {
        self.rows.get(&id)
    }

    pub fn score(&self, id: CustomerId) -> RiskResult<ScoreView> {
        self.get(id)
            .map(CachedPrediction::score)
            .ok_or(RiskError::NotFound { customer_id: id })
    }

    pub fn main_features(&self, id: CustomerId) -> RiskResult<MainFeatures> {
        self.get(id)
            .map(|row| row.features.clone())
            .ok_or(RiskError::NotFound { customer_id: id })
    }

    /// Pairwise values of two columns, skipping rows missing either.
    ///
    /// Asking for the same column twice yields identical sequences.
    pub fn bivariate(&self, feat_x: &str, feat_y: &str) -> RiskResult<BivariateData> {
        let x = parse_column(feat_x)?;
        let y = parse_column(feat_y)?;
        let mut data = BivariateData::default();
        for row in self.order.iter().filter_map(|id| self.rows.get(id)) {
            if let (Some(vx), Some(vy)) = (row.column(x), row.column(y)) {
                data.x_data.push(vx);
                data.y_data.push(vy);
            }
        }
        Ok(data)
    }
}

fn parse_column(name: &str) -> RiskResult<CacheColumn> {
    CacheColumn::parse(name).ok_or_else(|| RiskError::InvalidFeature {
        name: name.to_string(),
        valid: CacheColumn::names(),
    })
}

/// Dashboard features for display: the `DAYS_EMPLOYED` sentinel becomes
/// missing and the remaining values are shown as absolute day counts.
fn display_features(table: &CustomerTable, position: usize, sentinel: f64) -> MainFeatures {
    let mut features = MainFeatures::default();
    for feature in DashboardFeature::ALL {
        let raw = table.value(position, feature.as_str());
        let value = match feature {
            DashboardFeature::DaysEmployed => raw.filter(|v| *v != sentinel).map(f64::abs),
            _ => raw,
        };
        features.set(feature, value);
    }
    features
}

/// Resets the warming flag even if the build panics.
struct WarmingFlag<'a>(&'a AtomicBool);

impl<'a> WarmingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for WarmingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Single-flight gate around the `Empty → Ready` transition.
#[derive(Debug, Default)]
pub struct WarmupGate {
    ready: OnceLock<PredictionCache>,
    warmup_lock: Mutex<()>,
    warming: AtomicBool,
    runs: AtomicU64,
    failures: AtomicU64,
}

impl WarmupGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CacheState {
        if self.ready.get().is_some() {
            CacheState::Ready
        } else if self.warming.load(Ordering::SeqCst) {
            CacheState::Warming
        } else {
            CacheState::Empty
        }
    }

    /// Completed builds. Never exceeds 1.
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::SeqCst)
    }

    /// Failed build attempts.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }

    /// The published cache, if warmup already completed.
    pub fn get(&self) -> Option<&PredictionCache> {
        self.ready.get()
    }

    /// Return the cache, running `build` first if nothing is published.
    pub fn get_or_warm<F>(&self, build: F) -> RiskResult<&PredictionCache>
    where
        F: FnOnce() -> RiskResult<PredictionCache>,
    {
        if let Some(cache) = self.ready.get() {
            return Ok(cache);
        }

        let _guard = self.warmup_lock.lock();
        // another caller may have finished while we waited
        if let Some(cache) = self.ready.get() {
            return Ok(cache);
        }

        log::info!("WARMUP: computing predictions for all customers...");
        let start = Instant::now();
        let built = {
            let _flag = WarmingFlag::raise(&self.warming);
            build()
        };

        match built {
            Ok(cache) => {
                self.runs.fetch_add(1, Ordering::SeqCst);
                log::info!(
                    "WARMUP COMPLETE in {:.2}s. Cache ready ({} customers).",
                    start.elapsed().as_secs_f64(),
                    cache.len()
                );
                Ok(self.ready.get_or_init(|| cache))
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::SeqCst);
                log::error!(
                    "WARMUP FAILED after {:.2}s, cache left empty: {e}",
                    start.elapsed().as_secs_f64()
                );
                Err(e)
            }
        }
    }
}
