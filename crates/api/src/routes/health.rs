use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process is serving requests.
    pub status: &'static str,
    /// Jobs still in the active partition.
    pub active_translations: usize,
    /// Jobs that reached a terminal state.
    pub completed_translations: usize,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
}

/// GET /api/health -- liveness plus registry partition sizes.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (active, completed) = state.registry.counts();

    Json(HealthResponse {
        status: "healthy",
        active_translations: active,
        completed_translations: completed,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Routes mounted at `/health`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
