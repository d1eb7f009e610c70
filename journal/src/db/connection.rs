use libsql::{Builder, Connection};
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::Result;

use super::schema;

const BUSY_TIMEOUT_MS: u64 = 5000;

pub struct Database {
    pub(crate) db: Arc<libsql::Database>,
    /// In-memory databases live per connection, so one is shared.
    pub(crate) shared: Option<Connection>,
}

impl Database {
    pub async fn new(config: &StoreConfig) -> Result<Self> {
        let (db, in_memory) =
            if config.url.starts_with("libsql://") || config.url.starts_with("https://") {
                let db = Builder::new_remote(
                    config.url.clone(),
                    config.auth_token.clone().unwrap_or_default(),
                )
                .build()
                .await?;
                (db, false)
            } else if config.url == ":memory:" {
                (Builder::new_local(":memory:").build().await?, true)
            } else {
                let path = config.url.strip_prefix("file:").unwrap_or(&config.url);
                (Builder::new_local(path).build().await?, false)
            };

        let shared = if in_memory { Some(db.connect()?) } else { None };

        let database = Self {
            db: Arc::new(db),
            shared,
        };
        database.configure_database().await?;
        database.init_schema().await?;

        tracing::info!(url = %redact_url(&config.url), "Entry database ready");

        Ok(database)
    }

    pub fn connect(&self) -> Result<Connection> {
        match &self.shared {
            Some(conn) => Ok(conn.clone()),
            None => Ok(self.db.connect()?),
        }
    }

    async fn configure_database(&self) -> Result<()> {
        let conn = self.connect()?;

        let busy_timeout_sql = format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}");
        if let Err(error) = conn.execute_batch(&busy_timeout_sql).await {
            tracing::warn!(
                busy_timeout_ms = BUSY_TIMEOUT_MS,
                error = %error,
                "Failed to set SQLite busy_timeout"
            );
        }

        Ok(())
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        schema::init_schema(&conn).await?;
        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            shared: self.shared.clone(),
        }
    }
}

/// Strip query parameters, which may carry credentials.
fn redact_url(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}
