use axum::extract::State;
use axum::Json;

use crate::api::dto::ErrorResponse;
use crate::api::extractors::AppJson;
use crate::api::state::AppState;
use crate::error::Result;
use crate::models::{EmotionAnalysis, JournalEntry};

/// `POST /analyze_emotion`
#[utoipa::path(
    post,
    path = "/analyze_emotion",
    tag = "emotion",
    request_body = JournalEntry,
    responses(
        (status = 200, description = "Ranked emotions with recommendations", body = EmotionAnalysis),
        (status = 400, description = "Malformed or blank entry", body = ErrorResponse),
        (status = 503, description = "Emotion model unavailable", body = ErrorResponse),
    )
)]
pub async fn analyze_emotion(
    State(state): State<AppState>,
    AppJson(entry): AppJson<JournalEntry>,
) -> Result<Json<EmotionAnalysis>> {
    let analysis = state.analysis.analyze(&entry).await?;
    Ok(Json(analysis))
}
