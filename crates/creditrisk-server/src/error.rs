// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - HTTP Error Mapping
// ─────────────────────────────────────────────────────────────────────

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use creditrisk_types::RiskError;

/// Error body returned by every route: `{"detail": "..."}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Status code plus client-facing detail.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn unavailable() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "Service is unavailable.")
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

impl From<RiskError> for ApiError {
    fn from(err: RiskError) -> Self {
        match &err {
            RiskError::NotFound { .. } | RiskError::InvalidFeature { .. } => {
                Self::not_found(err.to_string())
            }
            RiskError::Explanation { .. } => Self::internal("Could not retrieve SHAP values."),
            e if e.is_fatal_load() => Self::unavailable(),
            _ => {
                log::error!("request failed: {err}");
                Self::internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (RiskError::NotFound { customer_id: 1 }, StatusCode::NOT_FOUND),
            (
                RiskError::InvalidFeature {
                    name: "X".into(),
                    valid: vec![],
                },
                StatusCode::NOT_FOUND,
            ),
            (
                RiskError::Explanation {
                    customer_id: 1,
                    reason: "null".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                RiskError::Prediction("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                RiskError::DatasetLoad("gone".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_not_found_detail() {
        let api = ApiError::from(RiskError::NotFound { customer_id: 123 });
        assert_eq!(api.detail, "Customer ID 123 not found.");
    }
}
