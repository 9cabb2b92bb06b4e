//! Download facade implementation.
//!
//! Every operation here follows the same shape: check the lifecycle guard,
//! hand the delegate call to the serial executor, await the outcome, and
//! re-emit the affected records as events. The facade adds no download
//! semantics of its own.
//!
//! # Concurrency Model
//!
//! - One serial executor per facade; delegate calls never overlap
//! - The lifecycle guard is checked before any work is submitted
//! - Probe cycles share the executor, so observation deliveries are
//!   consistent with operation ordering

pub(crate) mod lifecycle;

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tracing::{debug, warn};

use towline_core::download::{
    DownloadEvent, DownloadId, DownloadRecord, DownloadRequest, DownloadStatus, FacadeError,
    FacadeResult, GroupId,
};
use towline_core::ports::{
    ActiveDownloadsObserver, DownloadEnginePort, DownloadEventEmitterPort, DownloadRecordsPort,
    EngineError, ObserverDispatcher, StoreError,
};

use crate::config::FacadeConfig;
use crate::exec::SerialExecutor;
use crate::notifier::ActiveDownloadNotifier;

use lifecycle::Lifecycle;

/// Constructor shorthand for the per-record events an operation emits.
type EventCtor = fn(DownloadRecord) -> DownloadEvent;

fn added(download: DownloadRecord) -> DownloadEvent {
    DownloadEvent::Added { download }
}
fn queued(download: DownloadRecord) -> DownloadEvent {
    DownloadEvent::Queued { download }
}
fn paused(download: DownloadRecord) -> DownloadEvent {
    DownloadEvent::Paused { download }
}
fn resumed(download: DownloadRecord) -> DownloadEvent {
    DownloadEvent::Resumed { download }
}
fn cancelled(download: DownloadRecord) -> DownloadEvent {
    DownloadEvent::Cancelled { download }
}
fn removed(download: DownloadRecord) -> DownloadEvent {
    DownloadEvent::Removed { download }
}
fn deleted(download: DownloadRecord) -> DownloadEvent {
    DownloadEvent::Deleted { download }
}
fn completed(download: DownloadRecord) -> DownloadEvent {
    DownloadEvent::Completed { download }
}

/// Dependencies for creating a download facade.
///
/// This struct bundles the ports and configuration needed to construct a
/// [`DownloadFacade`]; the owning application builds it once and passes the
/// facade to all consumers.
pub struct FacadeDeps<E, R, M, D>
where
    E: DownloadEnginePort + 'static,
    R: DownloadRecordsPort + 'static,
    M: DownloadEventEmitterPort + 'static,
    D: ObserverDispatcher + 'static,
{
    /// Delegate engine performing actual transfers and scheduling.
    pub engine: Arc<E>,
    /// Read access to the persisted download records.
    pub records: Arc<R>,
    /// Sink for re-emitted download events.
    pub emitter: Arc<M>,
    /// Presentation context for observer callbacks.
    pub dispatcher: Arc<D>,
    /// Facade configuration.
    pub config: FacadeConfig,
}

/// Build a facade from its dependencies.
///
/// Must be called from within a tokio runtime; the facade spawns its serial
/// executor and probe scheduler on construction.
pub fn build_facade<E, R, M, D>(deps: FacadeDeps<E, R, M, D>) -> DownloadFacade
where
    E: DownloadEnginePort + 'static,
    R: DownloadRecordsPort + 'static,
    M: DownloadEventEmitterPort + 'static,
    D: ObserverDispatcher + 'static,
{
    DownloadFacade::new(
        deps.engine,
        deps.records,
        deps.emitter,
        deps.dispatcher,
        deps.config,
    )
}

/// The outward-facing object through which all download operations and
/// observations are issued.
pub struct DownloadFacade {
    namespace: String,
    engine: Arc<dyn DownloadEnginePort>,
    records: Arc<dyn DownloadRecordsPort>,
    emitter: Arc<dyn DownloadEventEmitterPort>,
    lifecycle: Arc<Lifecycle>,
    notifier: ActiveDownloadNotifier,
    exec: SerialExecutor,
}

impl DownloadFacade {
    fn new<E, R, M, D>(
        engine: Arc<E>,
        records: Arc<R>,
        emitter: Arc<M>,
        dispatcher: Arc<D>,
        config: FacadeConfig,
    ) -> Self
    where
        E: DownloadEnginePort + 'static,
        R: DownloadRecordsPort + 'static,
        M: DownloadEventEmitterPort + 'static,
        D: ObserverDispatcher + 'static,
    {
        let engine: Arc<dyn DownloadEnginePort> = engine;
        let records: Arc<dyn DownloadRecordsPort> = records;
        let emitter: Arc<dyn DownloadEventEmitterPort> = emitter;
        let dispatcher: Arc<dyn ObserverDispatcher> = dispatcher;
        let lifecycle = Arc::new(Lifecycle::new());
        let exec = SerialExecutor::spawn(&config.namespace);
        let notifier = ActiveDownloadNotifier::start(
            Arc::clone(&engine),
            dispatcher,
            Arc::clone(&lifecycle),
            config.active_downloads_check_interval,
            exec.clone(),
        );

        Self {
            namespace: config.namespace,
            engine,
            records,
            emitter,
            lifecycle,
            notifier,
            exec,
        }
    }

    /// Name of this facade instance, as used in logs.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Whether [`DownloadFacade::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lifecycle.is_closed()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Close the facade.
    ///
    /// Idempotent and terminal: the probe is cancelled synchronously, all
    /// observations are dropped, every subsequent operation fails with
    /// [`FacadeError::Closed`], and engine shutdown runs on the background
    /// context. Operations already submitted are allowed to finish.
    pub fn close(&self) {
        if !self.lifecycle.close() {
            return;
        }
        debug!(target: "towline.facade", namespace = %self.namespace, "closing facade");
        self.notifier.shutdown();

        let engine = Arc::clone(&self.engine);
        let namespace = self.namespace.clone();
        self.exec.submit(async move {
            if let Err(error) = engine.shutdown().await {
                warn!(
                    target: "towline.facade",
                    %namespace,
                    %error,
                    "engine shutdown failed"
                );
            }
        });
    }

    // ─────────────────────────────────────────────────────────────────────
    // Active-download observation
    // ─────────────────────────────────────────────────────────────────────

    /// Register an observer for the recurring active-downloads check.
    ///
    /// `include_added` selects which engine query variant the observer
    /// receives: counting or not counting downloads that were accepted but
    /// not yet queued. One registration per observer identity;
    /// re-registering updates the flag.
    pub fn observe_active_downloads(
        &self,
        observer: Arc<dyn ActiveDownloadsObserver>,
        include_added: bool,
    ) -> FacadeResult<()> {
        let closed = self.lifecycle.lock();
        if *closed {
            return Err(FacadeError::Closed);
        }
        self.notifier.register(observer, include_added);
        Ok(())
    }

    /// Remove an observer's registration, if present.
    pub fn stop_observing_active_downloads(
        &self,
        observer: &Arc<dyn ActiveDownloadsObserver>,
    ) -> FacadeResult<()> {
        let closed = self.lifecycle.lock();
        if *closed {
            return Err(FacadeError::Closed);
        }
        self.notifier.deregister(observer);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Enqueue
    // ─────────────────────────────────────────────────────────────────────

    /// Enqueue a single download.
    pub async fn enqueue(&self, request: DownloadRequest) -> FacadeResult<DownloadRecord> {
        let mut records = self.enqueue_batch(vec![request]).await?;
        records.pop().ok_or(FacadeError::EnqueueFailed)
    }

    /// Enqueue a batch of downloads.
    ///
    /// Batches naming the same target file twice are rejected before the
    /// engine sees them. Emits `Added`/`Queued`/`Completed` per record
    /// according to the state the engine assigned.
    pub async fn enqueue_batch(
        &self,
        requests: Vec<DownloadRequest>,
    ) -> FacadeResult<Vec<DownloadRecord>> {
        if let Some(target) = first_duplicate_target(&requests) {
            return Err(FacadeError::duplicate_targets(target));
        }

        let engine = Arc::clone(&self.engine);
        let emitter = Arc::clone(&self.emitter);
        let namespace = self.namespace.clone();
        self.run_serialized(async move {
            let records = match engine.enqueue(requests).await {
                Ok(records) => records,
                Err(error) => {
                    warn!(target: "towline.facade", %namespace, %error, "enqueue failed");
                    return Err(error.into());
                }
            };
            for record in &records {
                match record.status {
                    DownloadStatus::Added => {
                        debug!(target: "towline.facade", id = %record.id, "added download");
                        emitter.emit(added(record.clone()));
                    }
                    DownloadStatus::Queued => {
                        // Subscribers see the full lifecycle: the record
                        // passed through Added on its way to Queued.
                        debug!(target: "towline.facade", id = %record.id, "queued download");
                        emitter.emit(added(
                            record.clone().with_status(DownloadStatus::Added),
                        ));
                        emitter.emit(queued(record.clone()));
                    }
                    DownloadStatus::Completed => {
                        debug!(
                            target: "towline.facade",
                            id = %record.id,
                            "download already completed"
                        );
                        emitter.emit(completed(record.clone()));
                    }
                    _ => {}
                }
            }
            Ok(records)
        })
        .await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Pause / resume
    // ─────────────────────────────────────────────────────────────────────

    /// Pause the given downloads.
    pub async fn pause(&self, ids: Vec<DownloadId>) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.pause(&ids).await },
            [paused],
            "paused download",
        )
        .await
    }

    /// Pause a single download.
    pub async fn pause_download(&self, id: DownloadId) -> FacadeResult<DownloadRecord> {
        let mut records = self.pause(vec![id]).await?;
        records.pop().ok_or(FacadeError::not_found(id))
    }

    /// Pause every download in a group.
    pub async fn pause_group(&self, group: GroupId) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.pause_group(group).await },
            [paused],
            "paused download",
        )
        .await
    }

    /// Pause all downloads.
    pub async fn pause_all(&self) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.pause_all().await },
            [paused],
            "paused download",
        )
        .await
    }

    /// Resume the given downloads. Each resumed record is re-queued, so
    /// subscribers receive `Queued` followed by `Resumed`.
    pub async fn resume(&self, ids: Vec<DownloadId>) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.resume(&ids).await },
            [queued, resumed],
            "resumed download",
        )
        .await
    }

    /// Resume a single download.
    pub async fn resume_download(&self, id: DownloadId) -> FacadeResult<DownloadRecord> {
        let mut records = self.resume(vec![id]).await?;
        records.pop().ok_or(FacadeError::not_found(id))
    }

    /// Resume every download in a group.
    pub async fn resume_group(&self, group: GroupId) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.resume_group(group).await },
            [queued, resumed],
            "resumed download",
        )
        .await
    }

    /// Resume all paused downloads.
    pub async fn resume_all(&self) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.resume_all().await },
            [queued, resumed],
            "resumed download",
        )
        .await
    }

    /// Stop the engine from scheduling new transfers.
    pub async fn freeze(&self) -> FacadeResult<()> {
        let engine = Arc::clone(&self.engine);
        self.unit_op(async move { engine.freeze().await }, "froze engine")
            .await
    }

    /// Lift a previous [`DownloadFacade::freeze`].
    pub async fn unfreeze(&self) -> FacadeResult<()> {
        let engine = Arc::clone(&self.engine);
        self.unit_op(async move { engine.unfreeze().await }, "unfroze engine")
            .await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Remove / delete / cancel / retry
    // ─────────────────────────────────────────────────────────────────────

    /// Remove the given downloads, keeping downloaded data.
    pub async fn remove(&self, ids: Vec<DownloadId>) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.remove(&ids).await },
            [removed],
            "removed download",
        )
        .await
    }

    /// Remove a single download.
    pub async fn remove_download(&self, id: DownloadId) -> FacadeResult<DownloadRecord> {
        let mut records = self.remove(vec![id]).await?;
        records.pop().ok_or(FacadeError::not_found(id))
    }

    /// Remove every download in a group.
    pub async fn remove_group(&self, group: GroupId) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.remove_group(group).await },
            [removed],
            "removed download",
        )
        .await
    }

    /// Remove all downloads.
    pub async fn remove_all(&self) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.remove_all().await },
            [removed],
            "removed download",
        )
        .await
    }

    /// Remove all downloads currently in the given status.
    pub async fn remove_all_with_status(
        &self,
        status: DownloadStatus,
    ) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.remove_all_with_status(status).await },
            [removed],
            "removed download",
        )
        .await
    }

    /// Delete the given downloads together with their downloaded data.
    pub async fn delete(&self, ids: Vec<DownloadId>) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.delete(&ids).await },
            [deleted],
            "deleted download",
        )
        .await
    }

    /// Delete a single download.
    pub async fn delete_download(&self, id: DownloadId) -> FacadeResult<DownloadRecord> {
        let mut records = self.delete(vec![id]).await?;
        records.pop().ok_or(FacadeError::not_found(id))
    }

    /// Delete every download in a group.
    pub async fn delete_group(&self, group: GroupId) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.delete_group(group).await },
            [deleted],
            "deleted download",
        )
        .await
    }

    /// Delete all downloads.
    pub async fn delete_all(&self) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.delete_all().await },
            [deleted],
            "deleted download",
        )
        .await
    }

    /// Delete all downloads currently in the given status.
    pub async fn delete_all_with_status(
        &self,
        status: DownloadStatus,
    ) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.delete_all_with_status(status).await },
            [deleted],
            "deleted download",
        )
        .await
    }

    /// Cancel the given downloads, keeping partial data.
    pub async fn cancel(&self, ids: Vec<DownloadId>) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.cancel(&ids).await },
            [cancelled],
            "cancelled download",
        )
        .await
    }

    /// Cancel a single download.
    pub async fn cancel_download(&self, id: DownloadId) -> FacadeResult<DownloadRecord> {
        let mut records = self.cancel(vec![id]).await?;
        records.pop().ok_or(FacadeError::not_found(id))
    }

    /// Cancel every download in a group.
    pub async fn cancel_group(&self, group: GroupId) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.cancel_group(group).await },
            [cancelled],
            "cancelled download",
        )
        .await
    }

    /// Cancel all downloads.
    pub async fn cancel_all(&self) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.cancel_all().await },
            [cancelled],
            "cancelled download",
        )
        .await
    }

    /// Re-queue the given failed or cancelled downloads.
    pub async fn retry(&self, ids: Vec<DownloadId>) -> FacadeResult<Vec<DownloadRecord>> {
        let engine = Arc::clone(&self.engine);
        self.records_op(
            async move { engine.retry(&ids).await },
            [queued],
            "requeued download",
        )
        .await
    }

    /// Retry a single download.
    pub async fn retry_download(&self, id: DownloadId) -> FacadeResult<DownloadRecord> {
        let mut records = self.retry(vec![id]).await?;
        records.pop().ok_or(FacadeError::not_found(id))
    }

    /// Set the engine's concurrent transfer limit.
    pub async fn set_download_concurrent_limit(&self, limit: u32) -> FacadeResult<()> {
        let engine = Arc::clone(&self.engine);
        self.unit_op(
            async move { engine.set_concurrent_limit(limit).await },
            "set concurrent limit",
        )
        .await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    /// Look up a single download.
    pub async fn get_download(&self, id: DownloadId) -> FacadeResult<Option<DownloadRecord>> {
        let records = Arc::clone(&self.records);
        self.store_op(async move { records.get_by_id(id).await }).await
    }

    /// All downloads known to the record store.
    pub async fn get_downloads(&self) -> FacadeResult<Vec<DownloadRecord>> {
        let records = Arc::clone(&self.records);
        self.store_op(async move { records.get_all().await }).await
    }

    /// Downloads matching a set of ids; missing ids are skipped.
    pub async fn get_downloads_by_ids(
        &self,
        ids: Vec<DownloadId>,
    ) -> FacadeResult<Vec<DownloadRecord>> {
        let records = Arc::clone(&self.records);
        self.store_op(async move { records.get_by_ids(&ids).await })
            .await
    }

    /// All downloads in a group.
    pub async fn get_downloads_in_group(
        &self,
        group: GroupId,
    ) -> FacadeResult<Vec<DownloadRecord>> {
        let records = Arc::clone(&self.records);
        self.store_op(async move { records.get_by_group(group).await })
            .await
    }

    /// All downloads currently in the given status.
    pub async fn get_downloads_with_status(
        &self,
        status: DownloadStatus,
    ) -> FacadeResult<Vec<DownloadRecord>> {
        let records = Arc::clone(&self.records);
        self.store_op(async move { records.get_by_status(status).await })
            .await
    }

    /// All downloads carrying the given tag.
    pub async fn get_downloads_by_tag(
        &self,
        tag: impl Into<String>,
    ) -> FacadeResult<Vec<DownloadRecord>> {
        let records = Arc::clone(&self.records);
        let tag = tag.into();
        self.store_op(async move { records.get_by_tag(&tag).await })
            .await
    }

    /// All downloads carrying the given correlation identifier.
    pub async fn get_downloads_by_identifier(
        &self,
        identifier: u64,
    ) -> FacadeResult<Vec<DownloadRecord>> {
        let records = Arc::clone(&self.records);
        self.store_op(async move { records.get_by_identifier(identifier).await })
            .await
    }

    /// One-shot variant of the probe's engine query.
    pub async fn has_active_downloads(&self, include_added: bool) -> FacadeResult<bool> {
        let engine = Arc::clone(&self.engine);
        let namespace = self.namespace.clone();
        self.run_serialized(async move {
            engine
                .has_active_downloads(include_added)
                .await
                .map_err(|error| {
                    warn!(
                        target: "towline.facade",
                        %namespace,
                        %error,
                        "active downloads query failed"
                    );
                    error.into()
                })
        })
        .await
    }

    /// The record store's change-notification stream.
    ///
    /// The receiver holds the current record set and signals on every
    /// persisted change.
    pub fn downloads_stream(&self) -> FacadeResult<watch::Receiver<Vec<DownloadRecord>>> {
        if self.lifecycle.is_closed() {
            return Err(FacadeError::Closed);
        }
        Ok(self.records.watch())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Plumbing
    // ─────────────────────────────────────────────────────────────────────

    /// Run `job` on the serial executor and hand its outcome back.
    ///
    /// Fails fast with [`FacadeError::Closed`] when the facade is closed;
    /// the check and the submission happen under the lifecycle lock so a
    /// racing close is observed consistently.
    async fn run_serialized<T, F>(&self, job: F) -> FacadeResult<T>
    where
        T: Send + 'static,
        F: Future<Output = FacadeResult<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        {
            let closed = self.lifecycle.lock();
            if *closed {
                return Err(FacadeError::Closed);
            }
            self.exec.submit(async move {
                let _ = tx.send(job.await);
            });
        }
        rx.await.unwrap_or(Err(FacadeError::Closed))
    }

    /// Pass-through for engine operations that report affected records.
    ///
    /// Emits each constructor in `events` per record, in order, and logs
    /// one debug line per record.
    async fn records_op<F, const N: usize>(
        &self,
        action: F,
        events: [EventCtor; N],
        verb: &'static str,
    ) -> FacadeResult<Vec<DownloadRecord>>
    where
        F: Future<Output = Result<Vec<DownloadRecord>, EngineError>> + Send + 'static,
    {
        let emitter = Arc::clone(&self.emitter);
        let namespace = self.namespace.clone();
        self.run_serialized(async move {
            let records = match action.await {
                Ok(records) => records,
                Err(error) => {
                    warn!(target: "towline.facade", %namespace, %error, "engine operation failed");
                    return Err(error.into());
                }
            };
            for record in &records {
                debug!(target: "towline.facade", id = %record.id, "{verb}");
                for ctor in events {
                    emitter.emit(ctor(record.clone()));
                }
            }
            Ok(records)
        })
        .await
    }

    /// Pass-through for engine operations with no affected records.
    async fn unit_op<F>(&self, action: F, verb: &'static str) -> FacadeResult<()>
    where
        F: Future<Output = Result<(), EngineError>> + Send + 'static,
    {
        let namespace = self.namespace.clone();
        self.run_serialized(async move {
            match action.await {
                Ok(()) => {
                    debug!(target: "towline.facade", %namespace, "{verb}");
                    Ok(())
                }
                Err(error) => {
                    warn!(target: "towline.facade", %namespace, %error, "engine operation failed");
                    Err(error.into())
                }
            }
        })
        .await
    }

    /// Serialized read from the record store.
    async fn store_op<T, F>(&self, query: F) -> FacadeResult<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, StoreError>> + Send + 'static,
    {
        self.run_serialized(async move { query.await.map_err(FacadeError::from) })
            .await
    }
}

/// First target path that appears more than once in a batch, if any.
fn first_duplicate_target(requests: &[DownloadRequest]) -> Option<String> {
    let mut seen = HashSet::new();
    for request in requests {
        if !seen.insert(request.target.as_str()) {
            return Some(request.target.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_duplicate_target() {
        let a = DownloadRequest::new("https://example.com/a", "/tmp/a.bin");
        let b = DownloadRequest::new("https://example.com/b", "/tmp/b.bin");
        let dup = DownloadRequest::new("https://example.com/c", "/tmp/a.bin");

        assert_eq!(first_duplicate_target(&[a.clone(), b.clone()]), None);
        assert_eq!(
            first_duplicate_target(&[a, b, dup]),
            Some("/tmp/a.bin".to_string())
        );
        assert_eq!(first_duplicate_target(&[]), None);
    }
}
