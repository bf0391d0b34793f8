use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use std::fs::Metadata;
use std::io;

/// Byte stream flowing into (`store`) or out of (`fetch`) the store.
pub type ByteStream<'a> = BoxStream<'a, io::Result<Bytes>>;

/// A file held in the storage root, as reported to clients.
///
/// Always derived from filesystem state at the time of the call; nothing is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// On-disk name, the only identifier clients see
    pub name: String,
    /// Size in bytes
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

impl StoredFile {
    pub fn from_metadata(name: String, metadata: &Metadata) -> Self {
        // Platforms without mtime support report the epoch
        let last_modified = metadata.modified().map(DateTime::<Utc>::from).unwrap_or_default();

        Self {
            name,
            size: metadata.len(),
            last_modified,
        }
    }
}

/// An opened file ready to be streamed to a client.
pub struct FileDownload {
    pub file: StoredFile,
    pub body: ByteStream<'static>,
}

impl std::fmt::Debug for FileDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDownload").field("file", &self.file).finish_non_exhaustive()
    }
}
