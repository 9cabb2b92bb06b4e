//! Core domain types for downloads.
//!
//! Pure data types with no I/O dependencies.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

/// Canonical identifier for a download.
///
/// Derived deterministically from the request's url and target path, so the
/// same (url, target) pair always maps to the same id. This mirrors the
/// delegate engine's identity rule: re-enqueueing the same file is a
/// collision, not a new download.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DownloadId(u64);

impl DownloadId {
    /// Derive the id for a (url, target) pair.
    #[must_use]
    pub fn from_parts(url: &str, target: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        hasher.update([0u8]);
        hasher.update(target.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self(u64::from_be_bytes(bytes))
    }

    /// Wrap a raw id value (for ids handed back by the engine or store).
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a group of related downloads.
///
/// Groups are caller-assigned; the engine schedules and reports on group
/// members collectively (pause group, resume group, and so on).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GroupId(u32);

impl GroupId {
    /// Create a group id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw group value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scheduling priority for a download request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadPriority {
    /// Scheduled ahead of normal work.
    High,
    /// Default priority.
    #[default]
    Normal,
    /// Scheduled after all other work.
    Low,
}

impl DownloadPriority {
    /// Get the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for DownloadPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a download record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    /// No status recorded yet.
    #[default]
    None,
    /// Accepted by the engine but not yet scheduled.
    Added,
    /// Waiting in the engine's queue.
    Queued,
    /// Transfer in progress.
    Downloading,
    /// Paused by the caller.
    Paused,
    /// Completed successfully.
    Completed,
    /// Cancelled by the caller; partial data retained.
    Cancelled,
    /// Failed with an error.
    Failed,
    /// Removed from the engine; downloaded data retained.
    Removed,
    /// Removed from the engine together with its downloaded data.
    Deleted,
}

impl DownloadStatus {
    /// Convert to string representation for storage and wire formats.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Added => "added",
            Self::Queued => "queued",
            Self::Downloading => "downloading",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Removed => "removed",
            Self::Deleted => "deleted",
        }
    }

    /// Parse from string representation.
    ///
    /// Unknown values map to `None`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "added" => Self::Added,
            "queued" => Self::Queued,
            "downloading" => Self::Downloading,
            "paused" => Self::Paused,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            "failed" => Self::Failed,
            "removed" => Self::Removed,
            "deleted" => Self::Deleted,
            _ => Self::None,
        }
    }

    /// Whether this status counts toward the active-downloads check.
    ///
    /// Active means queued or downloading; `include_added` additionally
    /// counts downloads the engine has accepted but not yet queued.
    #[must_use]
    pub const fn is_active(self, include_added: bool) -> bool {
        match self {
            Self::Queued | Self::Downloading => true,
            Self::Added => include_added,
            _ => false,
        }
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request to enqueue a new download.
///
/// Pure data; the engine resolves it into a [`DownloadRecord`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// Source url.
    pub url: String,
    /// Absolute target path for the downloaded file.
    pub target: String,
    /// Group this download belongs to.
    pub group: GroupId,
    /// Scheduling priority.
    pub priority: DownloadPriority,
    /// Optional caller-assigned tag for lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Caller-assigned correlation value.
    pub identifier: u64,
    /// Extra request headers passed to the engine's HTTP client.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

impl DownloadRequest {
    /// Create a request with required fields and defaults for the rest.
    pub fn new(url: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            target: target.into(),
            group: GroupId::default(),
            priority: DownloadPriority::default(),
            tag: None,
            identifier: 0,
            headers: HashMap::new(),
        }
    }

    /// The id this request resolves to.
    #[must_use]
    pub fn id(&self) -> DownloadId {
        DownloadId::from_parts(&self.url, &self.target)
    }

    /// Set the group.
    #[must_use]
    pub const fn with_group(mut self, group: GroupId) -> Self {
        self.group = group;
        self
    }

    /// Set the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: DownloadPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set the correlation identifier.
    #[must_use]
    pub const fn with_identifier(mut self, identifier: u64) -> Self {
        self.identifier = identifier;
        self
    }

    /// Add a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// A persisted download as reported by the engine and record store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// Canonical id (derived from url + target).
    pub id: DownloadId,
    /// Source url.
    pub url: String,
    /// Absolute target path.
    pub target: String,
    /// Group this download belongs to.
    pub group: GroupId,
    /// Scheduling priority.
    pub priority: DownloadPriority,
    /// Optional caller-assigned tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Caller-assigned correlation value.
    pub identifier: u64,
    /// Current status.
    pub status: DownloadStatus,
    /// Bytes written to the target so far.
    pub downloaded_bytes: u64,
    /// Total size in bytes, when the server reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<u64>,
    /// Error message when `status` is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the engine first accepted the request.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl DownloadRecord {
    /// Create a fresh record for a request, in `Added` state.
    #[must_use]
    pub fn from_request(request: &DownloadRequest) -> Self {
        Self {
            id: request.id(),
            url: request.url.clone(),
            target: request.target.clone(),
            group: request.group,
            priority: request.priority,
            tag: request.tag.clone(),
            identifier: request.identifier,
            status: DownloadStatus::Added,
            downloaded_bytes: 0,
            total_bytes: None,
            error: None,
            created_at: chrono::Utc::now(),
        }
    }

    /// Return a copy with the given status.
    #[must_use]
    pub fn with_status(mut self, status: DownloadStatus) -> Self {
        self.status = status;
        self
    }

    /// Progress percentage in `0.0..=100.0`, or `-1.0` when the total size
    /// is not yet known.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        match self.total_bytes {
            Some(total) if total > 0 => {
                #[allow(clippy::cast_precision_loss)]
                let pct = self.downloaded_bytes as f64 / total as f64 * 100.0;
                pct.min(100.0)
            }
            _ => -1.0,
        }
    }
}
