pub mod backends;
mod connection;
pub(crate) mod schema;
pub mod traits;

use std::sync::Arc;

pub use backends::firestore::FirestoreBackend;
pub use backends::google_auth::{ServiceAccountKey, ServiceAccountTokenSource, StaticToken, TokenSource};
pub use backends::libsql::LibSqlBackend;
pub use connection::Database;
pub use traits::*;

use crate::config::StoreConfig;
use crate::error::Result;

/// Pick and open the entry store named by `DATABASE_URL`.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn EntryStore>> {
    if config.url.starts_with("firestore://") {
        return Ok(Arc::new(FirestoreBackend::from_config(config)?));
    }

    let db = Database::new(config).await?;
    Ok(Arc::new(LibSqlBackend::new(db, config.collection.clone())))
}
