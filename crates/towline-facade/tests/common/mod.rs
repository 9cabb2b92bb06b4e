//! Shared test doubles for facade integration tests.
#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use towline_facade::{
    ActiveDownloadsObserver, DownloadEnginePort, DownloadEvent, DownloadEventEmitterPort,
    DownloadFacade, DownloadId, DownloadRecord, DownloadRecordsPort, DownloadRequest,
    DownloadStatus, FacadeConfig, FacadeDeps, GroupId, InlineDispatcher, build_facade,
};
use towline_core::ports::{EngineError, StoreError};

/// Engine double with scripted replies and call recording.
#[derive(Default)]
pub struct ScriptedEngine {
    /// Operation log: one entry per engine call, with arguments.
    pub calls: Mutex<Vec<String>>,
    /// Records returned by every batch operation except `enqueue`.
    pub reply: Mutex<Vec<DownloadRecord>>,
    /// Status assigned to records produced by `enqueue`.
    pub enqueue_status: Mutex<Option<DownloadStatus>>,
    /// When set, `enqueue` accepts requests but reports no records.
    pub swallow_enqueue: AtomicBool,
    /// When set, every operation fails.
    pub fail_ops: AtomicBool,
    /// Answer for `has_active_downloads(true)`.
    pub active_with_added: AtomicBool,
    /// Answer for `has_active_downloads(false)`.
    pub active_strict: AtomicBool,
    /// Number of upcoming `has_active_downloads` calls that should fail.
    pub failing_probe_calls: AtomicUsize,
    /// Total `has_active_downloads` calls observed.
    pub probe_calls: AtomicUsize,
    /// Artificial latency for `has_active_downloads`, in milliseconds.
    pub probe_delay_ms: AtomicU64,
    /// Total `shutdown` calls observed.
    pub shutdown_calls: AtomicUsize,
}

impl ScriptedEngine {
    pub fn record_call(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_reply(&self, records: Vec<DownloadRecord>) {
        *self.reply.lock().unwrap() = records;
    }

    fn batch_result(&self, call: String) -> Result<Vec<DownloadRecord>, EngineError> {
        self.record_call(call);
        if self.fail_ops.load(Ordering::SeqCst) {
            return Err(EngineError::failed("scripted failure"));
        }
        Ok(self.reply.lock().unwrap().clone())
    }

    fn unit_result(&self, call: String) -> Result<(), EngineError> {
        self.record_call(call);
        if self.fail_ops.load(Ordering::SeqCst) {
            return Err(EngineError::failed("scripted failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl DownloadEnginePort for ScriptedEngine {
    async fn enqueue(
        &self,
        requests: Vec<DownloadRequest>,
    ) -> Result<Vec<DownloadRecord>, EngineError> {
        self.record_call(format!("enqueue {}", requests.len()));
        if self.fail_ops.load(Ordering::SeqCst) {
            return Err(EngineError::failed("scripted failure"));
        }
        if self.swallow_enqueue.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        let status = self.enqueue_status.lock().unwrap();
        Ok(requests
            .iter()
            .map(|request| {
                let record = DownloadRecord::from_request(request);
                match *status {
                    Some(status) => record.with_status(status),
                    None => record,
                }
            })
            .collect())
    }

    async fn pause(&self, ids: &[DownloadId]) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result(format!("pause {ids:?}"))
    }

    async fn pause_group(&self, group: GroupId) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result(format!("pause_group {group}"))
    }

    async fn pause_all(&self) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result("pause_all".to_string())
    }

    async fn resume(&self, ids: &[DownloadId]) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result(format!("resume {ids:?}"))
    }

    async fn resume_group(&self, group: GroupId) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result(format!("resume_group {group}"))
    }

    async fn resume_all(&self) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result("resume_all".to_string())
    }

    async fn freeze(&self) -> Result<(), EngineError> {
        self.unit_result("freeze".to_string())
    }

    async fn unfreeze(&self) -> Result<(), EngineError> {
        self.unit_result("unfreeze".to_string())
    }

    async fn remove(&self, ids: &[DownloadId]) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result(format!("remove {ids:?}"))
    }

    async fn remove_group(&self, group: GroupId) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result(format!("remove_group {group}"))
    }

    async fn remove_all(&self) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result("remove_all".to_string())
    }

    async fn remove_all_with_status(
        &self,
        status: DownloadStatus,
    ) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result(format!("remove_all_with_status {status}"))
    }

    async fn delete(&self, ids: &[DownloadId]) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result(format!("delete {ids:?}"))
    }

    async fn delete_group(&self, group: GroupId) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result(format!("delete_group {group}"))
    }

    async fn delete_all(&self) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result("delete_all".to_string())
    }

    async fn delete_all_with_status(
        &self,
        status: DownloadStatus,
    ) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result(format!("delete_all_with_status {status}"))
    }

    async fn cancel(&self, ids: &[DownloadId]) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result(format!("cancel {ids:?}"))
    }

    async fn cancel_group(&self, group: GroupId) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result(format!("cancel_group {group}"))
    }

    async fn cancel_all(&self) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result("cancel_all".to_string())
    }

    async fn retry(&self, ids: &[DownloadId]) -> Result<Vec<DownloadRecord>, EngineError> {
        self.batch_result(format!("retry {ids:?}"))
    }

    async fn set_concurrent_limit(&self, limit: u32) -> Result<(), EngineError> {
        self.unit_result(format!("set_concurrent_limit {limit}"))
    }

    async fn has_active_downloads(&self, include_added: bool) -> Result<bool, EngineError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.probe_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        let failing = self.failing_probe_calls.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_probe_calls.store(failing - 1, Ordering::SeqCst);
            return Err(EngineError::failed("probe failure"));
        }
        if include_added {
            Ok(self.active_with_added.load(Ordering::SeqCst))
        } else {
            Ok(self.active_strict.load(Ordering::SeqCst))
        }
    }

    async fn shutdown(&self) -> Result<(), EngineError> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Record store double backed by a watch channel.
pub struct InMemoryRecords {
    tx: watch::Sender<Vec<DownloadRecord>>,
}

impl InMemoryRecords {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self { tx }
    }

    /// Replace the record set and notify watchers.
    pub fn set(&self, records: Vec<DownloadRecord>) {
        // send_replace updates the value even while nobody is subscribed
        self.tx.send_replace(records);
    }

    fn current(&self) -> Vec<DownloadRecord> {
        self.tx.borrow().clone()
    }
}

impl Default for InMemoryRecords {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DownloadRecordsPort for InMemoryRecords {
    async fn get_all(&self) -> Result<Vec<DownloadRecord>, StoreError> {
        Ok(self.current())
    }

    async fn get_by_id(&self, id: DownloadId) -> Result<Option<DownloadRecord>, StoreError> {
        Ok(self.current().into_iter().find(|record| record.id == id))
    }

    async fn get_by_ids(&self, ids: &[DownloadId]) -> Result<Vec<DownloadRecord>, StoreError> {
        Ok(self
            .current()
            .into_iter()
            .filter(|record| ids.contains(&record.id))
            .collect())
    }

    async fn get_by_group(&self, group: GroupId) -> Result<Vec<DownloadRecord>, StoreError> {
        Ok(self
            .current()
            .into_iter()
            .filter(|record| record.group == group)
            .collect())
    }

    async fn get_by_status(
        &self,
        status: DownloadStatus,
    ) -> Result<Vec<DownloadRecord>, StoreError> {
        Ok(self
            .current()
            .into_iter()
            .filter(|record| record.status == status)
            .collect())
    }

    async fn get_by_tag(&self, tag: &str) -> Result<Vec<DownloadRecord>, StoreError> {
        Ok(self
            .current()
            .into_iter()
            .filter(|record| record.tag.as_deref() == Some(tag))
            .collect())
    }

    async fn get_by_identifier(
        &self,
        identifier: u64,
    ) -> Result<Vec<DownloadRecord>, StoreError> {
        Ok(self
            .current()
            .into_iter()
            .filter(|record| record.identifier == identifier)
            .collect())
    }

    fn watch(&self) -> watch::Receiver<Vec<DownloadRecord>> {
        self.tx.subscribe()
    }
}

/// Emitter double that captures every emitted event.
#[derive(Clone, Default)]
pub struct CapturingEmitter {
    events: Arc<Mutex<Vec<DownloadEvent>>>,
}

impl CapturingEmitter {
    pub fn events(&self) -> Vec<DownloadEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(DownloadEvent::event_name)
            .collect()
    }
}

impl DownloadEventEmitterPort for CapturingEmitter {
    fn emit(&self, event: DownloadEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn clone_box(&self) -> Box<dyn DownloadEventEmitterPort> {
        Box::new(self.clone())
    }
}

/// Observer double recording every delivered boolean.
#[derive(Default)]
pub struct CountingObserver {
    seen: Mutex<Vec<bool>>,
}

impl CountingObserver {
    pub fn seen(&self) -> Vec<bool> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl ActiveDownloadsObserver for CountingObserver {
    fn on_active_downloads(&self, has_active: bool) {
        self.seen.lock().unwrap().push(has_active);
    }
}

/// Everything a facade test needs, wired together.
pub struct TestHarness {
    pub engine: Arc<ScriptedEngine>,
    pub records: Arc<InMemoryRecords>,
    pub emitter: CapturingEmitter,
    pub facade: DownloadFacade,
}

/// Install a test subscriber so facade logs are visible on failures.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Build a facade over scripted collaborators with an inline dispatcher.
pub fn harness(interval: Duration) -> TestHarness {
    init_tracing();
    let engine = Arc::new(ScriptedEngine::default());
    let records = Arc::new(InMemoryRecords::new());
    let emitter = CapturingEmitter::default();
    let facade = build_facade(FacadeDeps {
        engine: Arc::clone(&engine),
        records: Arc::clone(&records),
        emitter: Arc::new(emitter.clone()),
        dispatcher: Arc::new(InlineDispatcher::new()),
        config: FacadeConfig::new("test").with_active_downloads_check_interval(interval),
    });
    TestHarness {
        engine,
        records,
        emitter,
        facade,
    }
}

/// A request with a unique url/target derived from the suffix.
pub fn sample_request(suffix: &str) -> DownloadRequest {
    DownloadRequest::new(
        format!("https://example.com/{suffix}"),
        format!("/downloads/{suffix}"),
    )
}

/// A record in the given status, derived from [`sample_request`].
pub fn sample_record(suffix: &str, status: DownloadStatus) -> DownloadRecord {
    DownloadRecord::from_request(&sample_request(suffix)).with_status(status)
}
