// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - Server Entry Point
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use std::sync::Arc;

use creditrisk_server::{create_router, AppState};
use creditrisk_types::ServiceConfig;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    let addr = config.bind_addr();
    let eager_warmup = config.eager_warmup;

    let state = Arc::new(AppState::start(config));

    if eager_warmup {
        if let Ok(service) = state.service() {
            tokio::task::spawn_blocking(move || {
                if let Err(e) = service.warmup() {
                    log::warn!("Eager warmup failed, will retry on first request: {e}");
                }
            });
        }
    }

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };
    log::info!("Listening on http://{addr}");

    if let Err(e) = axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        log::error!("Server error: {e}");
        std::process::exit(1);
    }
    log::info!("Application shutdown.");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install Ctrl+C handler: {e}");
    }
}
