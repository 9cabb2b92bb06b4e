//! Download domain: records, requests, events, and errors.
//!
//! Pure data types with no I/O dependencies. Everything here is "UI safe" -
//! Clone + Debug + Serialize + Deserialize, suitable for transmission over
//! SSE, IPC events, or CLI output.

mod errors;
mod events;
mod types;

pub use errors::{FacadeError, FacadeResult};
pub use events::DownloadEvent;
pub use types::{
    DownloadId, DownloadPriority, DownloadRecord, DownloadRequest, DownloadStatus, GroupId,
};
