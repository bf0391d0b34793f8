//! Directory enumeration for the file listing.

use std::io::ErrorKind;

use tokio::fs;
use tracing::{debug, warn};

use crate::storage::errors::{Result, StoreError};
use crate::storage::models::StoredFile;
use crate::storage::sanitizer::StorageRoot;

/// List the regular files directly inside `root`, sorted by [`sort_by_name`].
///
/// Directories and symlinks are skipped. An entry that disappears between `readdir` and `stat`
/// (a concurrent delete or rename) is dropped rather than failing the whole listing.
pub async fn enumerate(root: &StorageRoot) -> Result<Vec<StoredFile>> {
    let mut entries = fs::read_dir(root.path())
        .await
        .map_err(|source| StoreError::StoreUnavailable { source })?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| StoreError::StoreUnavailable { source })?
    {
        // DirEntry::metadata does not follow symlinks
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(entry = ?entry.file_name(), "Entry vanished during listing");
                continue;
            }
            Err(source) => return Err(StoreError::StoreUnavailable { source }),
        };

        if !metadata.is_file() {
            continue;
        }

        let Ok(name) = entry.file_name().into_string() else {
            warn!(entry = ?entry.file_name(), "Skipping entry with non UTF-8 name");
            continue;
        };

        files.push(StoredFile::from_metadata(name, &metadata));
    }

    sort_by_name(&mut files);
    Ok(files)
}

/// Sort ascending by name, ignoring case.
///
/// Uses Unicode lowercase mapping rather than locale collation so the order is the same on every
/// host. Names equal under case folding fall back to a byte-wise comparison to keep the order
/// total.
pub fn sort_by_name(files: &mut [StoredFile]) {
    files.sort_by_cached_key(|file| (file.name.to_lowercase(), file.name.clone()));
}
