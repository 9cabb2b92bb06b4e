//! Reactive facade over a delegate download engine.
//!
//! The facade owns no scheduling, I/O, retry, or persistence logic of its
//! own. Every operation forwards to the engine behind
//! [`DownloadEnginePort`], re-emits the outcome as [`DownloadEvent`]s, and
//! the one piece of original coordination - the recurring active-downloads
//! probe - fans engine state out to registered observers until the facade
//! is closed.
//!
//! # Architecture
//!
//! - **Facade**: lifecycle guard + pass-through operation surface
//! - **Serial executor**: one background task runs all delegate calls in
//!   submission order
//! - **Notifier**: self-rescheduling probe loop, interval measured from
//!   cycle completion
//!
//! # Concurrency Model
//!
//! - The closed flag is the only cross-context state; it is mutex-guarded
//! - Probe cycles ride the serial executor, so they never overlap each
//!   other or an operation
//! - Observer callbacks run on the injected presentation dispatcher

// Re-export core types for convenience
pub use towline_core::download::{
    DownloadEvent, DownloadId, DownloadPriority, DownloadRecord, DownloadRequest, DownloadStatus,
    FacadeError, FacadeResult, GroupId,
};
pub use towline_core::ports::{
    ActiveDownloadsObserver, BroadcastEmitter, DownloadEnginePort, DownloadEventEmitterPort,
    DownloadRecordsPort, InlineDispatcher, NoopDownloadEmitter, ObserverDispatcher,
    SpawnDispatcher,
};

// Internal modules (pub(crate) to keep implementation private)
pub(crate) mod exec;
pub(crate) mod notifier;

mod config;
pub use config::FacadeConfig;

// Public API - the facade itself
mod facade;

pub use facade::{DownloadFacade, FacadeDeps, build_facade};
