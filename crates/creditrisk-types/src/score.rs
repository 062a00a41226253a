// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - Score and View Types
// ─────────────────────────────────────────────────────────────────────

use std::fmt;

use serde::{Deserialize, Serialize};

/// Map a raw float to an explicit optional, treating NaN and Inf as missing.
#[inline]
pub fn finite_or_none(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

/// Credit decision derived from the positive-class probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accepted,
    Refused,
}

impl Decision {
    /// `Refused` iff `probability_pos >= threshold`.
    pub fn from_probability(probability_pos: f64, threshold: f64) -> Self {
        if probability_pos >= threshold {
            Self::Refused
        } else {
            Self::Accepted
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Refused => "refused",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four raw features shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardFeature {
    ExtSource3,
    ExtSource2,
    DaysEmployed,
    OwnCarAge,
}

impl DashboardFeature {
    pub const ALL: [DashboardFeature; 4] = [
        Self::ExtSource3,
        Self::ExtSource2,
        Self::DaysEmployed,
        Self::OwnCarAge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtSource3 => "EXT_SOURCE_3",
            Self::ExtSource2 => "EXT_SOURCE_2",
            Self::DaysEmployed => "DAYS_EMPLOYED",
            Self::OwnCarAge => "OWN_CAR_AGE",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

/// Numeric columns of the prediction cache usable for bivariate queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheColumn {
    Feature(DashboardFeature),
    ProbabilityPos,
    ProbabilityNeg,
    Threshold,
}

impl CacheColumn {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "probability_pos" => Some(Self::ProbabilityPos),
            "probability_neg" => Some(Self::ProbabilityNeg),
            "threshold" => Some(Self::Threshold),
            other => DashboardFeature::parse(other).map(Self::Feature),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feature(f) => f.as_str(),
            Self::ProbabilityPos => "probability_pos",
            Self::ProbabilityNeg => "probability_neg",
            Self::Threshold => "threshold",
        }
    }

    /// Every valid column name, in cache column order.
    pub fn names() -> Vec<String> {
        DashboardFeature::ALL
            .iter()
            .map(|f| f.as_str())
            .chain(["probability_pos", "probability_neg", "threshold"])
            .map(String::from)
            .collect()
    }
}

/// Score gauge payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreView {
    pub probability_pos: f64,
    pub threshold: f64,
    pub decision: Decision,
}

/// Main dashboard features. Missing values serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MainFeatures {
    #[serde(rename = "EXT_SOURCE_3")]
    pub ext_source_3: Option<f64>,
    #[serde(rename = "EXT_SOURCE_2")]
    pub ext_source_2: Option<f64>,
    #[serde(rename = "DAYS_EMPLOYED")]
    pub days_employed: Option<f64>,
    #[serde(rename = "OWN_CAR_AGE")]
    pub own_car_age: Option<f64>,
}

impl MainFeatures {
    pub fn get(&self, feature: DashboardFeature) -> Option<f64> {
        match feature {
            DashboardFeature::ExtSource3 => self.ext_source_3,
            DashboardFeature::ExtSource2 => self.ext_source_2,
            DashboardFeature::DaysEmployed => self.days_employed,
            DashboardFeature::OwnCarAge => self.own_car_age,
        }
    }

    pub fn set(&mut self, feature: DashboardFeature, value: Option<f64>) {
        let slot = match feature {
            DashboardFeature::ExtSource3 => &mut self.ext_source_3,
            DashboardFeature::ExtSource2 => &mut self.ext_source_2,
            DashboardFeature::DaysEmployed => &mut self.days_employed,
            DashboardFeature::OwnCarAge => &mut self.own_car_age,
        };
        *slot = value.and_then(finite_or_none);
    }
}

/// Local attribution for one customer (waterfall plot payload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalExplanation {
    pub base_value: f64,
    pub values: Vec<f64>,
    pub feature_names: Vec<String>,
}

/// Scatter plot payload. Both sequences always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BivariateData {
    pub x_data: Vec<f64>,
    pub y_data: Vec<f64>,
}

/// Composite dashboard payload (score + features + explanation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub score: ScoreView,
    pub features: MainFeatures,
    pub shap: LocalExplanation,
}

/// Observable state of the warmup gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    Empty,
    Warming,
    Ready,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_boundary_is_refused() {
        assert_eq!(Decision::from_probability(0.5, 0.5), Decision::Refused);
        assert_eq!(Decision::from_probability(0.4999, 0.5), Decision::Accepted);
        assert_eq!(Decision::from_probability(0.9, 0.5), Decision::Refused);
    }

    #[test]
    fn test_decision_serializes_lowercase() {
        let json = serde_json::to_string(&Decision::Refused).unwrap();
        assert_eq!(json, "\"refused\"");
    }

    #[test]
    fn test_finite_or_none() {
        assert_eq!(finite_or_none(f64::NAN), None);
        assert_eq!(finite_or_none(f64::INFINITY), None);
        assert_eq!(finite_or_none(1.5), Some(1.5));
    }

    #[test]
    fn test_cache_column_parse() {
        assert_eq!(
            CacheColumn::parse("OWN_CAR_AGE"),
            Some(CacheColumn::Feature(DashboardFeature::OwnCarAge))
        );
        assert_eq!(CacheColumn::parse("threshold"), Some(CacheColumn::Threshold));
        assert_eq!(CacheColumn::parse("decision"), None);
        assert_eq!(CacheColumn::parse("AMT_CREDIT"), None);
        assert_eq!(CacheColumn::names().len(), 7);
    }

    #[test]
    fn test_main_features_missing_is_null() {
        let mut features = MainFeatures::default();
        features.set(DashboardFeature::ExtSource3, Some(0.42));
        features.set(DashboardFeature::OwnCarAge, Some(f64::NAN));
        let json = serde_json::to_value(&features).unwrap();
        assert_eq!(json["EXT_SOURCE_3"], serde_json::json!(0.42));
        assert!(json["OWN_CAR_AGE"].is_null());
        assert!(json["DAYS_EMPLOYED"].is_null());
    }

    #[test]
    fn test_cache_state_names() {
        let json = serde_json::to_string(&CacheState::Warming).unwrap();
        assert_eq!(json, "\"warming\"");
    }
}
