use async_trait::async_trait;
use chrono::SecondsFormat;
use libsql::params;
use nanoid::nanoid;

use crate::db::connection::Database;
use crate::db::traits::EntryStore;
use crate::error::{JournalError, Result};
use crate::models::{JournalEntry, StoredEntry};

pub struct LibSqlBackend {
    db: Database,
    collection: String,
}

impl LibSqlBackend {
    pub fn new(db: Database, collection: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl EntryStore for LibSqlBackend {
    async fn add_entry(&self, entry: &JournalEntry) -> Result<String> {
        let stored = StoredEntry::new(nanoid!(), entry);
        let conn = self.db.connect()?;
        conn.execute(
            r#"
            INSERT INTO entries (id, collection, text, user_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                stored.id.clone(),
                self.collection.clone(),
                stored.text.clone(),
                stored.user_id.clone(),
                stored.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )
        .await
        .map_err(|e| JournalError::StorageUnavailable(format!("Failed to insert entry: {e}")))?;

        Ok(stored.id)
    }

    async fn ping(&self) -> Result<()> {
        let conn = self.db.connect()?;
        conn.query("SELECT 1", ()).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "libsql"
    }
}
