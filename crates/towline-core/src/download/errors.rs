//! Facade error taxonomy.
//!
//! Designed to be serializable across process boundaries without depending
//! on non-serializable types; delegate failures are captured as strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::DownloadId;
use crate::ports::{EngineError, StoreError};

/// Error type for facade operations.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum FacadeError {
    /// The facade has been closed; construct a new instance to continue.
    #[error("facade is closed")]
    Closed,

    /// The delegate engine reported a failure.
    #[error("engine error: {message}")]
    Engine {
        /// Detailed error message from the engine.
        message: String,
    },

    /// The record store reported a failure.
    #[error("record store error: {message}")]
    Store {
        /// Detailed error message from the store.
        message: String,
    },

    /// A batch named the same target file more than once.
    #[error("duplicate target in batch: {target}")]
    DuplicateTargets {
        /// The first target that appeared twice.
        target: String,
    },

    /// The engine accepted the request but returned no record for it.
    #[error("enqueue did not produce a download")]
    EnqueueFailed,

    /// No download exists for the given id.
    #[error("download not found: {id}")]
    NotFound {
        /// The id that matched nothing.
        id: DownloadId,
    },
}

impl FacadeError {
    /// Create an engine error.
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    /// Create a record store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a duplicate-targets error.
    pub fn duplicate_targets(target: impl Into<String>) -> Self {
        Self::DuplicateTargets {
            target: target.into(),
        }
    }

    /// Create a not-found error.
    #[must_use]
    pub const fn not_found(id: DownloadId) -> Self {
        Self::NotFound { id }
    }

    /// Check if this is the closed-facade error.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Check if this error originated in a delegate rather than the facade.
    #[must_use]
    pub const fn is_delegate_failure(&self) -> bool {
        matches!(self, Self::Engine { .. } | Self::Store { .. })
    }
}

impl From<EngineError> for FacadeError {
    fn from(err: EngineError) -> Self {
        Self::Engine {
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for FacadeError {
    fn from(err: StoreError) -> Self {
        Self::Store {
            message: err.to_string(),
        }
    }
}

/// Convenience result type for facade operations.
pub type FacadeResult<T> = Result<T, FacadeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = FacadeError::engine("connection reset");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("connection reset"));

        let parsed: FacadeError = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, err);
    }

    #[test]
    fn test_predicates() {
        assert!(FacadeError::Closed.is_closed());
        assert!(!FacadeError::EnqueueFailed.is_closed());
        assert!(FacadeError::engine("x").is_delegate_failure());
        assert!(FacadeError::store("x").is_delegate_failure());
        assert!(!FacadeError::Closed.is_delegate_failure());
    }

    #[test]
    fn test_port_error_conversion() {
        let err: FacadeError = EngineError::Failed("timed out".to_string()).into();
        assert_eq!(
            err,
            FacadeError::Engine {
                message: "timed out".to_string()
            }
        );

        let err: FacadeError = StoreError::Backend("disk full".to_string()).into();
        assert!(matches!(err, FacadeError::Store { .. }));
    }
}
