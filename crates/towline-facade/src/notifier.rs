//! Active-download notifier.
//!
//! Owns the observation set and the recurring probe. Each cycle asks the
//! engine "any active downloads?" twice - counting and not counting
//! added-but-unqueued downloads - and fans the matching boolean out to
//! every registered observer on the presentation dispatcher.
//!
//! The probe reschedules itself only after a cycle completes, so the
//! configured interval is measured from completion, not start, and no two
//! cycles ever run concurrently. An engine failure skips that cycle's
//! delivery and nothing else; the loop stops only when the facade closes.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use towline_core::ports::{ActiveDownloadsObserver, DownloadEnginePort, ObserverDispatcher};

use crate::exec::SerialExecutor;
use crate::facade::lifecycle::Lifecycle;

/// A registered (observer, variant) pair.
#[derive(Clone)]
struct Observation {
    observer: Arc<dyn ActiveDownloadsObserver>,
    include_added: bool,
}

/// State shared between the facade, the probe scheduler, and in-flight
/// cycles.
struct NotifierShared {
    engine: Arc<dyn DownloadEnginePort>,
    dispatcher: Arc<dyn ObserverDispatcher>,
    lifecycle: Arc<Lifecycle>,
    observations: Mutex<Vec<Observation>>,
    cancel: CancellationToken,
    interval: Duration,
}

impl NotifierShared {
    fn observations(&self) -> std::sync::MutexGuard<'_, Vec<Observation>> {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to the notifier owned by the facade.
pub(crate) struct ActiveDownloadNotifier {
    shared: Arc<NotifierShared>,
}

impl ActiveDownloadNotifier {
    /// Create the notifier and start its probe scheduler.
    pub(crate) fn start(
        engine: Arc<dyn DownloadEnginePort>,
        dispatcher: Arc<dyn ObserverDispatcher>,
        lifecycle: Arc<Lifecycle>,
        interval: Duration,
        exec: SerialExecutor,
    ) -> Self {
        let shared = Arc::new(NotifierShared {
            engine,
            dispatcher,
            lifecycle,
            observations: Mutex::new(Vec::new()),
            cancel: CancellationToken::new(),
            interval,
        });
        tokio::spawn(run_scheduler(Arc::clone(&shared), exec));
        Self { shared }
    }

    /// Register an observation.
    ///
    /// At most one registration per observer identity: re-registering an
    /// already-known observer updates its `include_added` flag in place.
    pub(crate) fn register(
        &self,
        observer: Arc<dyn ActiveDownloadsObserver>,
        include_added: bool,
    ) {
        let mut observations = self.shared.observations();
        if let Some(existing) = observations
            .iter_mut()
            .find(|obs| Arc::ptr_eq(&obs.observer, &observer))
        {
            existing.include_added = include_added;
            return;
        }
        observations.push(Observation {
            observer,
            include_added,
        });
    }

    /// Remove the registration matching the observer's identity, if any.
    pub(crate) fn deregister(&self, observer: &Arc<dyn ActiveDownloadsObserver>) {
        let mut observations = self.shared.observations();
        if let Some(index) = observations
            .iter()
            .position(|obs| Arc::ptr_eq(&obs.observer, observer))
        {
            observations.remove(index);
            debug!(target: "towline.notifier", "removed active downloads observer");
        }
    }

    /// Cancel the probe permanently and drop all observations.
    ///
    /// Synchronous: after this returns, the already-scheduled next cycle
    /// will not fire.
    pub(crate) fn shutdown(&self) {
        self.shared.cancel.cancel();
        self.shared.observations().clear();
    }
}

/// Sleep, run one cycle on the serial executor, wait for it, repeat.
async fn run_scheduler(shared: Arc<NotifierShared>, exec: SerialExecutor) {
    loop {
        tokio::select! {
            () = shared.cancel.cancelled() => break,
            () = tokio::time::sleep(shared.interval) => {}
        }

        let (done_tx, done_rx) = oneshot::channel();
        if !exec.submit(probe_cycle(Arc::clone(&shared), done_tx)) {
            break;
        }
        // Interval is measured from completion of the cycle, not its start.
        if done_rx.await.is_err() {
            break;
        }
    }
    debug!(target: "towline.notifier", "active downloads probe stopped");
}

/// One probe cycle, run on the serial executor.
async fn probe_cycle(shared: Arc<NotifierShared>, done: oneshot::Sender<()>) {
    if !shared.lifecycle.is_closed() {
        match query_engine(&shared).await {
            Ok((with_added, strict)) => deliver(&shared, with_added, strict),
            Err(error) => {
                // Skip this cycle's delivery; the scheduler reschedules
                // regardless.
                warn!(
                    target: "towline.notifier",
                    %error,
                    "active downloads probe failed; retrying next interval"
                );
            }
        }
    }
    let _ = done.send(());
}

async fn query_engine(
    shared: &NotifierShared,
) -> Result<(bool, bool), towline_core::ports::EngineError> {
    let with_added = shared.engine.has_active_downloads(true).await?;
    let strict = shared.engine.has_active_downloads(false).await?;
    Ok((with_added, strict))
}

/// Fan the cycle's result out on the presentation dispatcher.
fn deliver(shared: &NotifierShared, with_added: bool, strict: bool) {
    let observations: Vec<Observation> = shared.observations().clone();
    if observations.is_empty() {
        return;
    }

    let lifecycle = Arc::clone(&shared.lifecycle);
    shared.dispatcher.dispatch(Box::new(move || {
        // Close may have won the race while this callback was in flight.
        if lifecycle.is_closed() {
            return;
        }
        for observation in observations {
            let has_active = if observation.include_added {
                with_added
            } else {
                strict
            };
            observation.observer.on_active_downloads(has_active);
        }
    }));
}
