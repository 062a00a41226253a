// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - HTTP Server
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! axum surface over [`creditrisk_core::InferenceService`].
//!
//! Error bodies are always `{"detail": "..."}`. Unknown customers and
//! unknown features answer 404, explanation failures 500, and every
//! core-backed route answers 503 when startup could not load the assets.

#![deny(unsafe_code)]

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
