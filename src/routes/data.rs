use axum::{extract::State, routing::get, Json, Router};
use tracing::error;

use crate::models::{AppState, DataResponse, DatabaseTimeResponse, ErrorPayload};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/data", get(get_data))
        .with_state(state)
}

/// Always 200: a failed lookup is reported in the body's `error` field.
async fn get_data(State(state): State<AppState>) -> Json<DataResponse> {
    let response = match state.database.current_time().await {
        Ok(date) => DataResponse::Time(DatabaseTimeResponse {
            date,
            message: "Hello from the database!".to_string(),
        }),
        Err(e) if e.is_connect() => {
            error!("Error connecting to the database: {}", e);
            DataResponse::Error(ErrorPayload {
                error: "Database connection failed".to_string(),
            })
        }
        Err(e) => {
            error!("Error while querying database: {}", e);
            DataResponse::Error(ErrorPayload {
                error: "Server error".to_string(),
            })
        }
    };

    Json(response)
}
