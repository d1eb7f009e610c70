use async_trait::async_trait;

use crate::error::Result;
use crate::models::JournalEntry;

/// Append-only persistence for journal entries.
///
/// Implementations own their collection name and connection handles and are
/// shared across requests as `Arc<dyn EntryStore>`.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Store `entry` as a new document and return the store-assigned id.
    async fn add_entry(&self, entry: &JournalEntry) -> Result<String>;

    /// Cheap reachability check for health reporting.
    async fn ping(&self) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}
