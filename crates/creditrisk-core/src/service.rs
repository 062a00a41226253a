// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - Inference Cache Service
// ─────────────────────────────────────────────────────────────────────
//! Owns the model, the customer table and the explanation store for
//! the process lifetime, and answers the dashboard queries.
//!
//! Construction loads everything but predicts nothing. The first query
//! that needs predictions pays the warmup; every later query reads the
//! published cache.

use std::sync::Arc;
use std::time::Instant;

use creditrisk_types::{
    BivariateData, CacheState, CustomerId, DashboardView, LocalExplanation, MainFeatures,
    RiskError, RiskResult, ScoreView, ServiceConfig,
};

use crate::assets::AssetPaths;
use crate::cache::{PredictionCache, WarmupGate};
use crate::dataset::CustomerTable;
use crate::explanation::ExplanationStore;
use crate::model::{LogisticModel, ScoringModel};
use crate::transform::{FeatureTransform, StandardTransform};

/// Inference cache service.
///
/// Thread-safe: the only mutable state is the warmup gate.
pub struct InferenceService {
    model: Arc<dyn ScoringModel>,
    transform: Arc<dyn FeatureTransform>,
    customers: CustomerTable,
    explanations: ExplanationStore,
    predictions: WarmupGate,
    days_employed_sentinel: f64,
}

impl InferenceService {
    /// Load all three artifacts from resolved paths.
    pub fn load(paths: &AssetPaths, config: &ServiceConfig) -> RiskResult<Self> {
        log::info!("Loading scoring model from {}...", paths.model_dir.display());
        let model = LogisticModel::load(&paths.model_dir, config.default_threshold)?;
        log::info!("Model loaded. Threshold: {}", model.threshold());

        log::info!("Loading raw data from {}...", paths.dataset.display());
        let customers =
            CustomerTable::from_path(&paths.dataset, &config.id_column, &config.import_columns)?;
        log::info!("Loaded {} customers", customers.len());

        log::info!("Loading explanation from {}...", paths.explanation.display());
        let explanations = ExplanationStore::from_path(&paths.explanation, customers.ids())?;
        log::info!("Explanation loaded ({} rows)", explanations.len());

        Ok(Self::from_parts(
            Arc::new(model),
            Arc::new(StandardTransform::new(config.days_employed_sentinel)),
            customers,
            explanations,
            config.days_employed_sentinel,
        ))
    }

    /// Assemble from already-loaded parts. The cache starts empty.
    pub fn from_parts(
        model: Arc<dyn ScoringModel>,
        transform: Arc<dyn FeatureTransform>,
        customers: CustomerTable,
        explanations: ExplanationStore,
        days_employed_sentinel: f64,
    ) -> Self {
        Self {
            model,
            transform,
            customers,
            explanations,
            predictions: WarmupGate::new(),
            days_employed_sentinel,
        }
    }

    /// All customer ids in load order. Never triggers warmup.
    pub fn list_customer_ids(&self) -> &[CustomerId] {
        self.customers.ids()
    }

    pub fn threshold(&self) -> f64 {
        self.model.threshold()
    }

    pub fn cache_state(&self) -> CacheState {
        self.predictions.state()
    }

    /// Completed warmups; 0 or 1 for the process lifetime.
    pub fn warmup_runs(&self) -> u64 {
        self.predictions.runs()
    }

    /// Make sure the prediction cache is populated. No-op once ready.
    pub fn warmup(&self) -> RiskResult<()> {
        self.predictions().map(|_| ())
    }

    fn predictions(&self) -> RiskResult<&PredictionCache> {
        self.predictions.get_or_warm(|| {
            PredictionCache::build(
                &self.customers,
                self.model.as_ref(),
                self.transform.as_ref(),
                self.days_employed_sentinel,
            )
        })
    }

    /// Score gauge data for one customer.
    pub fn get_score(&self, id: CustomerId) -> RiskResult<ScoreView> {
        self.predictions()?.score(id)
    }

    /// The four dashboard features, missing values as `None`.
    pub fn get_main_features(&self, id: CustomerId) -> RiskResult<MainFeatures> {
        self.predictions()?.main_features(id)
    }

    /// Local attribution for one customer, aligned by dataset load order.
    pub fn get_local_explanation(&self, id: CustomerId) -> RiskResult<LocalExplanation> {
        self.predictions()?;
        if !self.customers.contains(id) {
            return Err(RiskError::NotFound { customer_id: id });
        }
        self.explanations.lookup(id).map_err(|e| {
            log::error!("Error retrieving SHAP values for {id}: {e}");
            e
        })
    }

    /// Scatter data for two cache columns.
    pub fn get_bivariate(&self, feat_x: &str, feat_y: &str) -> RiskResult<BivariateData> {
        self.predictions()?.bivariate(feat_x, feat_y)
    }

    /// Score, features and explanation together; fails whole or not at all.
    pub fn get_dashboard(&self, id: CustomerId) -> RiskResult<DashboardView> {
        let start = Instant::now();
        let view = DashboardView {
            score: self.get_score(id)?,
            features: self.get_main_features(id)?,
            shap: self.get_local_explanation(id)?,
        };
        log::debug!(
            "dashboard for {id} assembled in {:.3}ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(view)
    }
}
