// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - Inference Cache Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for the
//! credit-risk inference cache.

pub mod config;
pub mod error;
pub mod score;

pub use config::ServiceConfig;
pub use error::{CustomerId, RiskError, RiskResult};
pub use score::{
    BivariateData, CacheColumn, CacheState, DashboardFeature, DashboardView, Decision,
    LocalExplanation, MainFeatures, ScoreView,
};
