//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the facade expects from its collaborators.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No transport or storage types in any signature
//! - The engine and record store are opaque: intent-based methods only
//! - Delivery mechanisms (events, observer callbacks) stay behind traits

pub mod dispatcher;
pub mod engine;
pub mod event_emitter;
pub mod observer;
pub mod records;

use thiserror::Error;

pub use dispatcher::{InlineDispatcher, ObserverDispatcher, SpawnDispatcher};
pub use engine::DownloadEnginePort;
pub use event_emitter::{BroadcastEmitter, DownloadEventEmitterPort, NoopDownloadEmitter};
pub use observer::ActiveDownloadsObserver;
pub use records::DownloadRecordsPort;

/// Errors reported by the delegate engine.
///
/// The engine is a black box; its failures reach this layer as messages,
/// not structured causes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The engine rejected or failed the operation.
    #[error("{0}")]
    Failed(String),

    /// The engine is shutting down and no longer accepts work.
    #[error("engine is shutting down")]
    ShuttingDown,
}

impl EngineError {
    /// Create a failure from any message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Errors reported by the download record store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Storage backend error (database, filesystem, etc.).
    #[error("{0}")]
    Backend(String),

    /// Serialization or deserialization of a record failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Create a backend failure from any message.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}
