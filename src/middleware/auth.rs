// Bearer-token gate for the diagnostics endpoint

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::models::AppState;
use crate::types::AppError;

/// Without a configured `DIAGNOSTICS_TOKEN` the route does not exist (404).
/// Otherwise the request must carry `Authorization: Bearer <token>`.
pub async fn require_diagnostics_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let expected = state
        .config
        .diagnostics
        .token
        .as_deref()
        .ok_or(AppError::NotFound)?;

    let authorized = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| verify_token(token, expected));

    if !authorized {
        warn!(path = %req.uri().path(), "Rejected diagnostics request");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}

/// Compares every byte so the time taken does not reveal the matching prefix.
pub fn verify_token(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_token() {
        assert!(verify_token("s3cret", "s3cret"));
        assert!(!verify_token("s3creT", "s3cret"));
        assert!(!verify_token("s3cret-longer", "s3cret"));
        assert!(!verify_token("", "s3cret"));
    }
}
