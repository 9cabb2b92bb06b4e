//! Core domain types and port definitions for towline.
//!
//! This crate holds the pure domain model of the download facade: record and
//! request types, the event union, error taxonomy, and the port traits the
//! facade expects from its collaborators (delegate engine, record store,
//! event emitter, presentation dispatcher). It performs no I/O of its own.

pub mod download;
pub mod ports;

// Re-export commonly used types for convenience
pub use download::{
    DownloadEvent, DownloadId, DownloadPriority, DownloadRecord, DownloadRequest, DownloadStatus,
    FacadeError, FacadeResult, GroupId,
};
pub use ports::{
    ActiveDownloadsObserver, BroadcastEmitter, DownloadEnginePort, DownloadEventEmitterPort,
    DownloadRecordsPort, EngineError, InlineDispatcher, NoopDownloadEmitter, ObserverDispatcher,
    SpawnDispatcher, StoreError,
};
