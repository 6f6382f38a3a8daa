//! Object-storage access to the public NEXRAD Level 2 buckets.
//!
//! Two collaborators the decode core consumes but does not own: the
//! archive bucket of completed records (`noaa-nexrad-level2`) and the
//! realtime chunk bucket (`unidata-nexrad-level2-chunks`). Both are open
//! data and all requests are unsigned.
//!
//! Retry/backoff policy belongs to the caller, not these clients.

pub mod archive;
pub mod config;
pub mod error;
pub mod realtime;
pub mod record;

pub use archive::ArchiveClient;
pub use config::ObjectStorageConfig;
pub use error::{Result, StorageError};
pub use realtime::RealtimeClient;
pub use record::RecordIdentifier;
