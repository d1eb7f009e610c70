use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Journal API",
        version = "1.0.0",
        description = "Emotion analysis and storage for journal entries.",
    ),
    paths(
        handlers::emotion::analyze_emotion,
        handlers::journal::save_journal_entry,
        handlers::health::health_check,
    ),
    components(schemas(
        models::JournalEntry,
        models::EmotionScore,
        models::EmotionAnalysis,
        dto::SaveEntryResponse,
        dto::ErrorResponse,
        dto::HealthResponse,
        dto::ClassifierStatus,
        dto::StoreStatus,
    )),
    tags(
        (name = "emotion", description = "Emotion classification and recommendations"),
        (name = "journal", description = "Journal entry persistence"),
        (name = "health", description = "Health check"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
