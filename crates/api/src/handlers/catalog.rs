//! Static catalog listings.

use axum::Json;
use bbm_core::catalog::{LanguageInfo, ModelInfo, LANGUAGES, MODELS};

/// GET /api/models
pub async fn list_models() -> Json<&'static [ModelInfo]> {
    Json(MODELS)
}

/// GET /api/languages
pub async fn list_languages() -> Json<&'static [LanguageInfo]> {
    Json(LANGUAGES)
}
