//! Route definitions for translation jobs.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::translate;
use crate::state::AppState;

/// Routes mounted at `/translate`.
///
/// ```text
/// POST   /                -> submit_translation
/// GET    /{id}            -> get_translation
/// POST   /{id}/pause      -> pause_translation
/// POST   /{id}/resume     -> resume_translation
/// DELETE /{id}/cancel     -> cancel_translation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(translate::submit_translation))
        .route("/{id}", get(translate::get_translation))
        .route("/{id}/pause", post(translate::pause_translation))
        .route("/{id}/resume", post(translate::resume_translation))
        .route("/{id}/cancel", delete(translate::cancel_translation))
}

/// Routes mounted at `/download`.
///
/// ```text
/// GET    /{id}            -> download_translation
/// ```
pub fn download_router() -> Router<AppState> {
    Router::new().route("/{id}", get(translate::download_translation))
}
