//! File-store core: everything that touches the storage root.
//!
//! The HTTP layer never builds a filesystem path itself. Every client-supplied name goes through
//! [`StorageRoot::resolve`] first, and every mutation goes through a [`FileStore`]
//! implementation, which reports outcomes as [`StoreError`] values that the API layer maps to
//! status codes exactly once.
//!
//! - [`sanitizer`]: untrusted name -> path inside the root, or a rejection
//! - [`naming`]: collision-resistant stored names for uploads
//! - [`listing`]: directory enumeration with size/mtime metadata
//! - [`file_store`]: the [`FileStore`] trait and the local-disk implementation

pub mod errors;
pub mod file_store;
pub mod listing;
pub mod models;
pub mod naming;
pub mod sanitizer;

pub use errors::StoreError;
pub use file_store::{FileStore, LocalFileStore, create_file_store};
pub use models::{ByteStream, FileDownload, StoredFile};
pub use sanitizer::{SafePath, StorageRoot};
