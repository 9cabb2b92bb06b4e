//! Download record store port definition.
//!
//! The persistence layer behind the engine is consumed read-only here:
//! lookups by id, group, tag, and status, plus a change-notification stream
//! over the full record set. Writes belong to the engine.

use async_trait::async_trait;
use tokio::sync::watch;

use super::StoreError;
use crate::download::{DownloadId, DownloadRecord, DownloadStatus, GroupId};

/// Port to the persisted download records.
///
/// # Usage
///
/// ```ignore
/// let records: Arc<dyn DownloadRecordsPort> = /* ... */;
/// let paused = records.get_by_status(DownloadStatus::Paused).await?;
/// let mut stream = records.watch();
/// while stream.changed().await.is_ok() {
///     render(&stream.borrow());
/// }
/// ```
#[async_trait]
pub trait DownloadRecordsPort: Send + Sync {
    /// All records, in the store's natural order.
    async fn get_all(&self) -> Result<Vec<DownloadRecord>, StoreError>;

    /// Look up a single record by id.
    async fn get_by_id(&self, id: DownloadId) -> Result<Option<DownloadRecord>, StoreError>;

    /// Look up records for a set of ids; missing ids are skipped.
    async fn get_by_ids(&self, ids: &[DownloadId]) -> Result<Vec<DownloadRecord>, StoreError>;

    /// All records in a group.
    async fn get_by_group(&self, group: GroupId) -> Result<Vec<DownloadRecord>, StoreError>;

    /// All records currently in the given status.
    async fn get_by_status(&self, status: DownloadStatus)
    -> Result<Vec<DownloadRecord>, StoreError>;

    /// All records carrying the given tag.
    async fn get_by_tag(&self, tag: &str) -> Result<Vec<DownloadRecord>, StoreError>;

    /// All records carrying the given correlation identifier.
    async fn get_by_identifier(&self, identifier: u64)
    -> Result<Vec<DownloadRecord>, StoreError>;

    /// The store's change-notification stream.
    ///
    /// The receiver holds the current record set and signals on every
    /// mutation the engine persists.
    fn watch(&self) -> watch::Receiver<Vec<DownloadRecord>>;
}
