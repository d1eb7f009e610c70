use axum::extract::State;
use axum::Json;

use crate::api::dto::{ErrorResponse, SaveEntryResponse};
use crate::api::extractors::AppJson;
use crate::api::state::AppState;
use crate::error::Result;
use crate::models::JournalEntry;
use crate::services::SAVED_MESSAGE;

/// `POST /save_journal_entry`
#[utoipa::path(
    post,
    path = "/save_journal_entry",
    tag = "journal",
    request_body = JournalEntry,
    responses(
        (status = 200, description = "Entry stored", body = SaveEntryResponse),
        (status = 400, description = "Malformed or blank entry", body = ErrorResponse),
        (status = 503, description = "Entry store unavailable", body = ErrorResponse),
    )
)]
pub async fn save_journal_entry(
    State(state): State<AppState>,
    AppJson(entry): AppJson<JournalEntry>,
) -> Result<Json<SaveEntryResponse>> {
    state.journal.save(&entry).await?;
    Ok(Json(SaveEntryResponse {
        message: SAVED_MESSAGE.to_string(),
    }))
}
