//! API Routes
//!
//! - `/`, `/health`, `/api/hello` - liveness and greetings
//! - `/api/data` - database time check
//! - `/api/upload`, `/api/list-images`, `/generate-presigned-url` - object storage
//! - `/api/debug-env` - token-gated configuration presence report

pub mod data;
pub mod diagnostics;
pub mod files;
pub mod health;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::cors_layer;
use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> anyhow::Result<Router> {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server.cors_allowed_origins)?;

    Ok(Router::new()
        .merge(health::router(state.clone()))
        .merge(data::router(state.clone()))
        .merge(files::router(state.clone()))
        .merge(diagnostics::router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}
