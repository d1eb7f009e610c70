use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Upper bound on a single entry. Larger bodies are truncated by the
/// tokenizer anyway; this keeps them out of the store.
pub const MAX_ENTRY_LENGTH: usize = 50_000;

/// A journal entry as submitted by the client.
///
/// Wire format: `{ "text": "...", "userId": "..." }`. Both fields are
/// required on every endpoint; empty strings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Free-text body of the entry.
    #[validate(length(max = 50_000, message = "text is too long"))]
    pub text: String,
    /// Opaque identifier of the author, owned by the client's auth system.
    #[validate(length(max = 256, message = "userId is too long"))]
    pub user_id: String,
}

impl JournalEntry {
    pub fn new(text: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            user_id: user_id.into(),
        }
    }
}

/// An entry as persisted by an [`EntryStore`](crate::db::EntryStore).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEntry {
    pub id: String,
    pub text: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl StoredEntry {
    pub fn new(id: String, entry: &JournalEntry) -> Self {
        Self {
            id,
            text: entry.text.clone(),
            user_id: entry.user_id.clone(),
            created_at: Utc::now(),
        }
    }
}
