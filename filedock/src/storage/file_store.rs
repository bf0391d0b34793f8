use std::fs::FileType;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::{debug, info, instrument, warn};

use crate::storage::{
    errors::{Result, StoreError},
    listing,
    models::{ByteStream, FileDownload, StoredFile},
    naming,
    sanitizer::StorageRoot,
};

/// Operations the HTTP surface can perform on managed files.
///
/// Implementations must pass every name argument through [`StorageRoot::resolve`] before touching
/// the filesystem, and must not retry: each failure is reported once.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// All files in the root, sorted case-insensitively by name
    async fn list(&self) -> Result<Vec<StoredFile>>;

    /// Write `body` under a freshly generated name derived from `original_name`
    async fn store<'a>(&self, original_name: &str, body: ByteStream<'a>) -> Result<StoredFile>;

    /// Open a file for streaming
    async fn fetch(&self, name: &str) -> Result<FileDownload>;

    async fn remove(&self, name: &str) -> Result<()>;

    /// Move `old_name` to `new_name`; fails with [`StoreError::AlreadyExists`] instead of
    /// overwriting
    async fn rename(&self, old_name: &str, new_name: &str) -> Result<()>;
}

// ============================================================================
// Local Filesystem Implementation
// ============================================================================

/// File store backed by a single local directory.
pub struct LocalFileStore {
    root: StorageRoot,
}

impl LocalFileStore {
    pub fn new(root: StorageRoot) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &StorageRoot {
        &self.root
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<StoredFile>> {
        listing::enumerate(&self.root).await
    }

    #[instrument(skip(self, body), err)]
    async fn store<'a>(&self, original_name: &str, body: ByteStream<'a>) -> Result<StoredFile> {
        if original_name.is_empty() {
            return Err(StoreError::NoFilePresent);
        }
        let base_name = naming::upload_base_name(original_name).ok_or_else(|| StoreError::InvalidName {
            name: original_name.to_string(),
        })?;

        let target = self.root.resolve(&naming::generate(base_name))?;
        let write_failure = |source| StoreError::WriteFailure {
            name: target.name().to_string(),
            source,
        };

        // create_new: a generated-name collision fails the upload rather than clobbering a file
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(target.as_path())
            .await
            .map_err(write_failure)?;

        let mut reader = StreamReader::new(body);
        let written = match tokio::io::copy(&mut reader, &mut file).await {
            Ok(written) => written,
            Err(source) => {
                warn!(
                    stored_name = target.name(),
                    error = %source,
                    "Upload interrupted, partial file left in storage root"
                );
                return Err(write_failure(source));
            }
        };

        file.flush().await.map_err(write_failure)?;
        file.sync_all().await.map_err(write_failure)?;
        let metadata = file.metadata().await.map_err(write_failure)?;

        info!(stored_name = target.name(), bytes = written, "Stored upload");
        Ok(StoredFile::from_metadata(target.name().to_string(), &metadata))
    }

    #[instrument(skip(self), err)]
    async fn fetch(&self, name: &str) -> Result<FileDownload> {
        let target = self.root.resolve(name)?;
        let read_failure = |source| StoreError::ReadFailure {
            name: target.name().to_string(),
            source,
        };

        // Follow symlinks and make sure the real file is still inside the root
        let real_path = match fs::canonicalize(target.as_path()).await {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found(target.name())),
            Err(source) => return Err(read_failure(source)),
        };
        if !self.root.contains(&real_path) {
            warn!(name, resolved = %real_path.display(), "Refusing to serve file outside storage root");
            return Err(StoreError::PathTraversal { name: name.to_string() });
        }

        let file = match fs::File::open(&real_path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found(target.name())),
            Err(source) => return Err(read_failure(source)),
        };
        let metadata = file.metadata().await.map_err(read_failure)?;
        if !metadata.is_file() {
            return Err(not_found(target.name()));
        }

        debug!(name = target.name(), size = metadata.len(), "Opened file for download");
        Ok(FileDownload {
            file: StoredFile::from_metadata(target.name().to_string(), &metadata),
            body: ReaderStream::new(file).boxed(),
        })
    }

    #[instrument(skip(self), err)]
    async fn remove(&self, name: &str) -> Result<()> {
        let target = self.root.resolve(name)?;
        let delete_failure = |source| StoreError::DeleteFailure {
            name: target.name().to_string(),
            source,
        };

        // Directories are invisible to list and fetch, so they do not exist here either
        if !is_file_entry(entry_type(target.as_path()).await.map_err(delete_failure)?) {
            return Err(not_found(target.name()));
        }

        match fs::remove_file(target.as_path()).await {
            Ok(()) => {
                info!(name = target.name(), "Deleted file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found(target.name())),
            Err(source) => Err(delete_failure(source)),
        }
    }

    #[instrument(skip(self), err)]
    async fn rename(&self, old_name: &str, new_name: &str) -> Result<()> {
        let from = self.root.resolve(old_name)?;
        let to = self.root.resolve(new_name)?;
        let rename_failure = |source| StoreError::RenameFailure {
            from: from.name().to_string(),
            to: to.name().to_string(),
            source,
        };

        if !is_file_entry(entry_type(from.as_path()).await.map_err(rename_failure)?) {
            return Err(not_found(from.name()));
        }
        if from == to {
            return Ok(());
        }

        // Check-then-move: a concurrent writer can still create `to` in between, and
        // fs::rename would then replace it.
        if entry_type(to.as_path()).await.map_err(rename_failure)?.is_some() {
            return Err(StoreError::AlreadyExists {
                name: to.name().to_string(),
            });
        }

        match fs::rename(from.as_path(), to.as_path()).await {
            Ok(()) => {
                info!(from = from.name(), to = to.name(), "Renamed file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found(from.name())),
            Err(source) => Err(rename_failure(source)),
        }
    }
}

fn not_found(name: &str) -> StoreError {
    StoreError::NotFound { name: name.to_string() }
}

/// Type of the entry at `path` without following symlinks, so a dangling link still counts as
/// taken. `None` when nothing is there.
async fn entry_type(path: &Path) -> std::io::Result<Option<FileType>> {
    match fs::symlink_metadata(path).await {
        Ok(metadata) => Ok(Some(metadata.file_type())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Anything but a directory is a managed file; a symlink is removed or renamed as the link itself.
fn is_file_entry(file_type: Option<FileType>) -> bool {
    file_type.is_some_and(|t| !t.is_dir())
}

// ============================================================================
// Factory
// ============================================================================

/// Open (creating if needed) the storage root and build the store on top of it.
pub async fn create_file_store(root_path: &Path) -> Result<Arc<dyn FileStore>> {
    let root = StorageRoot::open(root_path)
        .await
        .map_err(|source| StoreError::StoreUnavailable { source })?;

    tracing::info!("Using local storage root {:?}", root.path());
    Ok(Arc::new(LocalFileStore::new(root)))
}
