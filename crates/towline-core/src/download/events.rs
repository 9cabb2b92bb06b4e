//! Download events - discriminated union for all download state changes.
//!
//! The facade re-emits one of these after every successful pass-through
//! operation, carrying the affected record verbatim.

use serde::{Deserialize, Serialize};

use super::types::DownloadRecord;

/// Single discriminated union for all download events.
///
/// Serialized with a `type` tag so frontends can handle it as a
/// discriminated union:
///
/// ```json
/// { "type": "paused", "download": { "id": 42, "status": "paused", ... } }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DownloadEvent {
    /// The engine accepted a request; the download exists but is not queued.
    Added {
        /// The affected download.
        download: DownloadRecord,
    },

    /// The download entered the engine's queue.
    Queued {
        /// The affected download.
        download: DownloadRecord,
    },

    /// The transfer started.
    Started {
        /// The affected download.
        download: DownloadRecord,
    },

    /// The download was paused.
    Paused {
        /// The affected download.
        download: DownloadRecord,
    },

    /// A paused download was resumed.
    Resumed {
        /// The affected download.
        download: DownloadRecord,
    },

    /// The download was cancelled; partial data retained.
    Cancelled {
        /// The affected download.
        download: DownloadRecord,
    },

    /// The download was removed; downloaded data retained.
    Removed {
        /// The affected download.
        download: DownloadRecord,
    },

    /// The download and its data were deleted.
    Deleted {
        /// The affected download.
        download: DownloadRecord,
    },

    /// The download completed successfully.
    Completed {
        /// The affected download.
        download: DownloadRecord,
    },

    /// The download failed.
    Failed {
        /// The affected download, with `error` populated.
        download: DownloadRecord,
    },
}

impl DownloadEvent {
    /// Get the event name for wire protocols.
    ///
    /// Provides consistent event naming across transports.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Added { .. } => "download:added",
            Self::Queued { .. } => "download:queued",
            Self::Started { .. } => "download:started",
            Self::Paused { .. } => "download:paused",
            Self::Resumed { .. } => "download:resumed",
            Self::Cancelled { .. } => "download:cancelled",
            Self::Removed { .. } => "download:removed",
            Self::Deleted { .. } => "download:deleted",
            Self::Completed { .. } => "download:completed",
            Self::Failed { .. } => "download:failed",
        }
    }

    /// The record the event refers to.
    #[must_use]
    pub const fn download(&self) -> &DownloadRecord {
        match self {
            Self::Added { download }
            | Self::Queued { download }
            | Self::Started { download }
            | Self::Paused { download }
            | Self::Resumed { download }
            | Self::Cancelled { download }
            | Self::Removed { download }
            | Self::Deleted { download }
            | Self::Completed { download }
            | Self::Failed { download } => download,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::{DownloadRequest, DownloadStatus};

    fn record() -> DownloadRecord {
        DownloadRecord::from_request(&DownloadRequest::new(
            "https://example.com/a.bin",
            "/tmp/a.bin",
        ))
    }

    #[test]
    fn test_event_serialization() {
        let event = DownloadEvent::Paused {
            download: record().with_status(DownloadStatus::Paused),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"paused\""));
        assert!(json.contains("\"status\":\"paused\""));
    }

    /// Lock down event names to prevent subscriber mismatches across
    /// transports.
    #[test]
    fn event_names_are_stable() {
        let cases = vec![
            (DownloadEvent::Added { download: record() }, "download:added"),
            (DownloadEvent::Queued { download: record() }, "download:queued"),
            (DownloadEvent::Paused { download: record() }, "download:paused"),
            (DownloadEvent::Resumed { download: record() }, "download:resumed"),
            (
                DownloadEvent::Cancelled { download: record() },
                "download:cancelled",
            ),
            (
                DownloadEvent::Completed { download: record() },
                "download:completed",
            ),
        ];

        for (event, expected_name) in cases {
            assert_eq!(event.event_name(), expected_name);
        }
    }
}
