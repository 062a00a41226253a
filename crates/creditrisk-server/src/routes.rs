// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - HTTP Routes
// ─────────────────────────────────────────────────────────────────────

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the application router.
///
/// # Routes
///
/// ## Dashboard data
/// - `GET /customers` - customer ids in dataset order
/// - `GET /customer/{id}/dashboard` - score, features and explanation in one payload
/// - `GET /customer/{id}/score`
/// - `GET /customer/{id}/features`
/// - `GET /customer/{id}/shap`
/// - `GET /features/bivariate_data?feat_x=..&feat_y=..`
///
/// ## Static artifacts
/// - `GET /shap/global` - global beeswarm PNG
/// - `GET /features/{feature}/distribution` - histogram data
///
/// ## Health
/// - `GET /health`
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/customers", get(handlers::customers))
        .route("/customer/{id}/dashboard", get(handlers::dashboard))
        .route("/customer/{id}/score", get(handlers::score))
        .route("/customer/{id}/features", get(handlers::features))
        .route("/customer/{id}/shap", get(handlers::shap))
        .route("/features/bivariate_data", get(handlers::bivariate))
        .route("/features/{feature}/distribution", get(handlers::distribution))
        .route("/shap/global", get(handlers::global_shap))
        .with_state(state)
}
