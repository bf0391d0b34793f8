use std::io;
use thiserror::Error;

/// Outcome of a failed file-store operation.
///
/// Nothing below the HTTP boundary retries or recovers from these; they are returned as-is and
/// translated to a response once in [`crate::errors::Error`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// Empty name, or a name that does not denote a single file in the root
    #[error("Invalid filename {name:?}")]
    InvalidName { name: String },

    /// Name resolves (or points) outside the storage root
    #[error("Path {name:?} escapes the storage root")]
    PathTraversal { name: String },

    #[error("File {name:?} not found")]
    NotFound { name: String },

    /// Upload request carried no file part
    #[error("No file present in upload")]
    NoFilePresent,

    #[error("Failed to write {name:?}")]
    WriteFailure {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {name:?}")]
    ReadFailure {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to delete {name:?}")]
    DeleteFailure {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to rename {from:?} to {to:?}")]
    RenameFailure {
        from: String,
        to: String,
        #[source]
        source: io::Error,
    },

    /// Rename target is already taken; overwriting is never done implicitly
    #[error("File {name:?} already exists")]
    AlreadyExists { name: String },

    /// The storage root itself could not be created or read
    #[error("Storage root is unavailable")]
    StoreUnavailable {
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// Short stable label, used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::InvalidName { .. } => "invalid_name",
            StoreError::PathTraversal { .. } => "path_traversal",
            StoreError::NotFound { .. } => "not_found",
            StoreError::NoFilePresent => "no_file_present",
            StoreError::WriteFailure { .. } => "write_failure",
            StoreError::ReadFailure { .. } => "read_failure",
            StoreError::DeleteFailure { .. } => "delete_failure",
            StoreError::RenameFailure { .. } => "rename_failure",
            StoreError::AlreadyExists { .. } => "already_exists",
            StoreError::StoreUnavailable { .. } => "store_unavailable",
        }
    }

    /// Whether the failure was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidName { .. }
                | StoreError::PathTraversal { .. }
                | StoreError::NotFound { .. }
                | StoreError::NoFilePresent
                | StoreError::AlreadyExists { .. }
        )
    }
}

/// Type alias for file-store operation results
pub type Result<T> = std::result::Result<T, StoreError>;
