//! Delegate engine port definition.
//!
//! This port is the boundary to the underlying download manager, which owns
//! transfer execution, retry/backoff, priority scheduling, and bandwidth
//! control. The facade never re-implements any of that; every method here is
//! a pass-through target.
//!
//! # Design
//!
//! - Batch operations return the records they affected, post-transition
//! - Group/all/status variants mirror the engine's own selection rules
//! - `has_active_downloads` is the only query; reads go through
//!   [`super::DownloadRecordsPort`]

use async_trait::async_trait;

use super::EngineError;
use crate::download::{DownloadId, DownloadRecord, DownloadRequest, DownloadStatus, GroupId};

/// Port to the delegate download engine.
///
/// Implementations are expected to be internally thread-safe; the facade
/// serializes its own calls but places no ordering requirement on other
/// users of the same engine.
#[async_trait]
pub trait DownloadEnginePort: Send + Sync {
    /// Hand a batch of requests to the engine.
    ///
    /// Returns one record per accepted request, in the engine's resulting
    /// state (`Added`, `Queued`, or `Completed` for files the engine already
    /// holds).
    async fn enqueue(
        &self,
        requests: Vec<DownloadRequest>,
    ) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Pause the given downloads. Returns the records actually paused.
    async fn pause(&self, ids: &[DownloadId]) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Pause every download in a group.
    async fn pause_group(&self, group: GroupId) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Pause all downloads.
    async fn pause_all(&self) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Resume the given downloads. Returns the records re-queued.
    async fn resume(&self, ids: &[DownloadId]) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Resume every download in a group.
    async fn resume_group(&self, group: GroupId) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Resume all paused downloads.
    async fn resume_all(&self) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Stop scheduling new transfers until [`Self::unfreeze`] is called.
    async fn freeze(&self) -> Result<(), EngineError>;

    /// Lift a previous [`Self::freeze`].
    async fn unfreeze(&self) -> Result<(), EngineError>;

    /// Remove the given downloads, keeping downloaded data on disk.
    async fn remove(&self, ids: &[DownloadId]) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Remove every download in a group.
    async fn remove_group(&self, group: GroupId) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Remove all downloads.
    async fn remove_all(&self) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Remove all downloads currently in the given status.
    async fn remove_all_with_status(
        &self,
        status: DownloadStatus,
    ) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Delete the given downloads together with their downloaded data.
    async fn delete(&self, ids: &[DownloadId]) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Delete every download in a group.
    async fn delete_group(&self, group: GroupId) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Delete all downloads.
    async fn delete_all(&self) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Delete all downloads currently in the given status.
    async fn delete_all_with_status(
        &self,
        status: DownloadStatus,
    ) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Cancel the given downloads, keeping partial data.
    async fn cancel(&self, ids: &[DownloadId]) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Cancel every download in a group.
    async fn cancel_group(&self, group: GroupId) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Cancel all downloads.
    async fn cancel_all(&self) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Re-queue the given failed or cancelled downloads.
    async fn retry(&self, ids: &[DownloadId]) -> Result<Vec<DownloadRecord>, EngineError>;

    /// Set the engine's concurrent transfer limit.
    async fn set_concurrent_limit(&self, limit: u32) -> Result<(), EngineError>;

    /// Whether any download is active right now.
    ///
    /// Active means queued or downloading; `include_added` additionally
    /// counts downloads accepted but not yet queued.
    async fn has_active_downloads(&self, include_added: bool) -> Result<bool, EngineError>;

    /// Release the engine's resources. Called once, when the facade closes.
    async fn shutdown(&self) -> Result<(), EngineError>;
}
