use axum::{extract::State, routing::get, Json, Router};
use tracing::info;

use crate::models::{AppState, HealthResponse, MessageResponse, RootResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/hello", get(hello))
        .with_state(state)
}

async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "🚀 Deployment Successful again and again!".to_string(),
        status: "running".to_string(),
        timestamp: state.started_at.elapsed().as_secs_f64(),
        origin: state.config.server.frontend_domain.clone(),
    })
}

/// Liveness only; neither the database nor the store is consulted.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
    })
}

async fn hello() -> Json<MessageResponse> {
    info!("API endpoint hit");
    Json(MessageResponse {
        message: "Hello from the backend!".to_string(),
    })
}
