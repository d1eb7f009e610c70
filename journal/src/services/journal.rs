use std::sync::Arc;
use validator::Validate;

use crate::db::EntryStore;
use crate::error::{JournalError, Result};
use crate::models::JournalEntry;

use super::validation_error;

/// Acknowledgement returned for every saved entry.
pub const SAVED_MESSAGE: &str = "Saved entry to Firebase";

#[derive(Clone)]
pub struct JournalService {
    store: Arc<dyn EntryStore>,
}

impl JournalService {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self { store }
    }

    /// Persist `entry` and return its store-assigned id.
    pub async fn save(&self, entry: &JournalEntry) -> Result<String> {
        entry.validate().map_err(validation_error)?;

        let id = self.store.add_entry(entry).await.map_err(|e| match e {
            JournalError::Database(err) => {
                JournalError::StorageUnavailable(format!("Database write failed: {err}"))
            }
            JournalError::Http(err) => {
                JournalError::StorageUnavailable(format!("Store request failed: {err}"))
            }
            other => other,
        })?;

        tracing::info!(
            entry_id = %id,
            backend = self.store.backend_name(),
            "Saved journal entry"
        );

        Ok(id)
    }
}
