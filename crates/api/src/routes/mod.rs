pub mod health;
pub mod translate;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                          liveness and job counts
///
/// /models                          model catalog
/// /languages                       target language catalog
///
/// /translate                       submit (POST, multipart)
/// /translate/{id}                  progress snapshot
/// /translate/{id}/pause            pause (POST)
/// /translate/{id}/resume           resume (POST)
/// /translate/{id}/cancel           cancel (DELETE)
///
/// /download/{id}                   finished artifact
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .route("/models", get(handlers::catalog::list_models))
        .route("/languages", get(handlers::catalog::list_languages))
        .nest("/translate", translate::router())
        .nest("/download", translate::download_router())
}
