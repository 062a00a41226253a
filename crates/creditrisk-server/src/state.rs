// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - Application State
// ─────────────────────────────────────────────────────────────────────
//! Shared state handed to every handler.
//!
//! Construction failures are caught once here. The service is then
//! permanently absent and every core-backed route answers 503; static
//! artifacts keep being served.

use std::sync::Arc;

use creditrisk_core::{AssetLayout, InferenceService};
use creditrisk_types::ServiceConfig;

use crate::error::ApiError;

pub struct AppState {
    service: Option<Arc<InferenceService>>,
    pub config: ServiceConfig,
}

impl AppState {
    pub fn new(service: Option<Arc<InferenceService>>, config: ServiceConfig) -> Self {
        Self { service, config }
    }

    /// Resolve assets and construct the service, degrading to
    /// "unavailable" on any failure.
    pub fn start(config: ServiceConfig) -> Self {
        log::info!("Application startup: initializing resources...");
        config.log_summary();

        let layout = AssetLayout::new(&config);
        // only for the startup warnings; static routes re-check per request
        layout.optional();
        let service = layout
            .resolve()
            .and_then(|paths| InferenceService::load(&paths, &config));

        match service {
            Ok(service) => {
                log::info!("Application startup complete. Service is ready.");
                log::info!("Predictions will be computed on first dashboard request.");
                Self::new(Some(Arc::new(service)), config)
            }
            Err(e) => {
                log::error!("Application startup failed: {e}");
                Self::new(None, config)
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.service.is_some()
    }

    /// The service, or the 503 every core-backed route returns without it.
    pub fn service(&self) -> Result<Arc<InferenceService>, ApiError> {
        self.service.clone().ok_or_else(ApiError::unavailable)
    }
}
