// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - HTTP Handlers
// ─────────────────────────────────────────────────────────────────────
//! Route handlers. Core calls run on the blocking pool because the
//! first one may carry the whole warmup.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use creditrisk_core::InferenceService;
use creditrisk_types::{
    BivariateData, CacheState, CustomerId, DashboardView, LocalExplanation, MainFeatures,
    RiskResult, ScoreView,
};

use crate::error::ApiError;
use crate::state::AppState;

const STATIC_CACHE_CONTROL: &str = "public, max-age=86400";

/// Run a core query on the blocking pool.
async fn with_service<T, F>(state: &AppState, query: F) -> Result<T, ApiError>
where
    F: FnOnce(&InferenceService) -> RiskResult<T> + Send + 'static,
    T: Send + 'static,
{
    let service = state.service()?;
    tokio::task::spawn_blocking(move || query(&service))
        .await
        .map_err(|e| ApiError::internal(format!("worker failed: {e}")))?
        .map_err(ApiError::from)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomersResponse {
    pub customer_ids: Vec<CustomerId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Metadata {
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub view: DashboardView,
    pub metadata: Metadata,
}

#[derive(Debug, Deserialize)]
pub struct BivariateParams {
    pub feat_x: String,
    pub feat_y: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub cache: Option<CacheState>,
    pub customers: usize,
}

/// GET /customers
pub async fn customers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CustomersResponse>, ApiError> {
    let service = state.service()?;
    Ok(Json(CustomersResponse {
        customer_ids: service.list_customer_ids().to_vec(),
    }))
}

/// GET /customer/{id}/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CustomerId>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let view = with_service(&state, move |svc| svc.get_dashboard(id)).await?;
    Ok(Json(DashboardResponse {
        view,
        metadata: Metadata {
            timestamp: chrono::Utc::now().to_rfc3339(),
        },
    }))
}

/// GET /customer/{id}/score
pub async fn score(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CustomerId>,
) -> Result<Json<ScoreView>, ApiError> {
    with_service(&state, move |svc| svc.get_score(id)).await.map(Json)
}

/// GET /customer/{id}/features
pub async fn features(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CustomerId>,
) -> Result<Json<MainFeatures>, ApiError> {
    with_service(&state, move |svc| svc.get_main_features(id))
        .await
        .map(Json)
}

/// GET /customer/{id}/shap
pub async fn shap(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CustomerId>,
) -> Result<Json<LocalExplanation>, ApiError> {
    with_service(&state, move |svc| svc.get_local_explanation(id))
        .await
        .map(Json)
}

/// GET /features/bivariate_data?feat_x=..&feat_y=..
pub async fn bivariate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BivariateParams>,
) -> Result<Json<BivariateData>, ApiError> {
    with_service(&state, move |svc| {
        svc.get_bivariate(&params.feat_x, &params.feat_y)
    })
    .await
    .map(Json)
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.service() {
        Ok(svc) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                cache: Some(svc.cache_state()),
                customers: svc.list_customer_ids().len(),
            }),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable".to_string(),
                cache: None,
                customers: 0,
            }),
        ),
    }
}

/// GET /shap/global
pub async fn global_shap(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let path = state.config.global_explanation_path();
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::not_found("SHAP beeswarm plot not found."))?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, STATIC_CACHE_CONTROL),
        ],
        bytes,
    ))
}

/// GET /features/{feature}/distribution
pub async fn distribution(
    State(state): State<Arc<AppState>>,
    Path(feature): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.config.distribution_features.contains(&feature) {
        let mut available = state.config.distribution_features.clone();
        available.sort();
        return Err(ApiError::not_found(format!(
            "Distribution not available for '{feature}'. Available: {available:?}"
        )));
    }
    let path = state.config.distribution_path(&feature);
    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|_| ApiError::not_found("Distribution file not found."))?;
    let data: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
        log::error!("Corrupt distribution file {}: {e}", path.display());
        ApiError::internal("Distribution file is corrupt.")
    })?;
    Ok(([(header::CACHE_CONTROL, STATIC_CACHE_CONTROL)], Json(data)))
}
