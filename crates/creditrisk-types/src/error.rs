// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - Inference Cache Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Customer business key (`SK_ID_CURR`).
pub type CustomerId = i64;

/// Root error type for all inference cache failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    /// A required artifact was not present where the asset provider left it.
    #[error("asset error: {0}")]
    Asset(String),

    /// Scoring model could not be loaded or its metadata is inconsistent.
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// Customer dataset could not be read, is missing columns, or repeats ids.
    #[error("dataset load error: {0}")]
    DatasetLoad(String),

    /// Explanation artifact could not be read.
    #[error("explanation load error: {0}")]
    ExplanationLoad(String),

    /// Customer id absent from the relevant store.
    #[error("Customer ID {customer_id} not found.")]
    NotFound { customer_id: CustomerId },

    /// Positional lookup or value coercion failed for a known customer.
    #[error("Could not retrieve SHAP values for customer {customer_id}: {reason}")]
    Explanation {
        customer_id: CustomerId,
        reason: String,
    },

    /// Feature name unknown to the prediction cache.
    #[error("Feature '{name}' not available. Available: {valid:?}")]
    InvalidFeature { name: String, valid: Vec<String> },

    /// Feature transform failed during warmup.
    #[error("transform error: {0}")]
    Transform(String),

    /// Model prediction failed during warmup.
    #[error("prediction error: {0}")]
    Prediction(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

impl RiskError {
    /// Construction-time failures that leave the service permanently unavailable.
    pub fn is_fatal_load(&self) -> bool {
        matches!(
            self,
            Self::Asset(_) | Self::ModelLoad(_) | Self::DatasetLoad(_) | Self::ExplanationLoad(_)
        )
    }

    /// Failures caused by the request itself rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::InvalidFeature { .. })
    }
}

pub type RiskResult<T> = Result<T, RiskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_load_family() {
        assert!(RiskError::Asset("x".into()).is_fatal_load());
        assert!(RiskError::ModelLoad("x".into()).is_fatal_load());
        assert!(RiskError::DatasetLoad("x".into()).is_fatal_load());
        assert!(RiskError::ExplanationLoad("x".into()).is_fatal_load());
        assert!(!RiskError::Prediction("x".into()).is_fatal_load());
        assert!(!RiskError::NotFound { customer_id: 1 }.is_fatal_load());
    }

    #[test]
    fn test_client_errors() {
        assert!(RiskError::NotFound { customer_id: 7 }.is_client_error());
        let invalid = RiskError::InvalidFeature {
            name: "AGE".into(),
            valid: vec!["EXT_SOURCE_3".into()],
        };
        assert!(invalid.is_client_error());
        let explanation = RiskError::Explanation {
            customer_id: 7,
            reason: "null value".into(),
        };
        assert!(!explanation.is_client_error());
    }

    #[test]
    fn test_not_found_message() {
        let err = RiskError::NotFound { customer_id: 100 };
        assert_eq!(err.to_string(), "Customer ID 100 not found.");
    }

    #[test]
    fn test_invalid_feature_lists_valid_names() {
        let err = RiskError::InvalidFeature {
            name: "AGE".into(),
            valid: vec!["DAYS_EMPLOYED".into(), "OWN_CAR_AGE".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("AGE"));
        assert!(msg.contains("DAYS_EMPLOYED"));
        assert!(msg.contains("OWN_CAR_AGE"));
    }
}
