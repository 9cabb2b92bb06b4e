//! Serial background executor.
//!
//! A single long-lived task drains an unbounded queue of jobs and runs them
//! strictly one at a time, in submission order. All delegate calls made by
//! the facade flow through one of these, which is what makes the facade an
//! actor in everything but name: callers submit and return immediately,
//! and no two delegate calls ever run concurrently.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tracing::debug;

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Handle to the serial background executor.
///
/// Cloning the handle shares the same queue. The executor task exits once
/// every handle has been dropped and the queue is drained.
#[derive(Clone)]
pub(crate) struct SerialExecutor {
    tx: mpsc::UnboundedSender<Job>,
}

impl SerialExecutor {
    /// Spawn the executor task and return a handle to it.
    pub(crate) fn spawn(namespace: &str) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let namespace = namespace.to_string();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                job.await;
            }
            debug!(target: "towline.facade", %namespace, "serial executor drained");
        });
        Self { tx }
    }

    /// Enqueue a job. Returns false if the executor is gone.
    pub(crate) fn submit<F>(&self, job: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tx.send(Box::pin(job)).is_ok()
    }
}
