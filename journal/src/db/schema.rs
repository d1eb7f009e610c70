use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Journal entries; `collection` mirrors the document-store collection name
        CREATE TABLE IF NOT EXISTS entries (
            id TEXT PRIMARY KEY,
            collection TEXT NOT NULL,
            text TEXT NOT NULL,
            user_id TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_entries_collection ON entries(collection);
        CREATE INDEX IF NOT EXISTS idx_entries_user_id ON entries(user_id);
        CREATE INDEX IF NOT EXISTS idx_entries_created_at ON entries(created_at);
        "#,
    )
    .await?;

    Ok(())
}
