use std::collections::BTreeMap;

use axum::{extract::State, middleware, routing::get, Json, Router};

use crate::middleware::require_diagnostics_token;
use crate::models::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/debug-env", get(debug_env))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_diagnostics_token,
        ))
        .with_state(state)
}

/// Which configuration values are set, never the values themselves.
async fn debug_env(State(state): State<AppState>) -> Json<BTreeMap<&'static str, bool>> {
    Json(state.config.presence())
}
