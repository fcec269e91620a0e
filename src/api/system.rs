use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{ApiError, AppState, HealthResponse};

/// `GET /health`
///
/// Readiness probe: answers `{"status":"ok"}` once the database answers a
/// `SELECT 1`.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    match state.store().ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response(),
        Err(e) => ApiError::DatabaseError(format!("Health check failed: {e:#}")).into_response(),
    }
}
