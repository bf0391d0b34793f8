use crate::storage::StoredFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single entry in the file listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    /// Stored name; use it verbatim in download, rename and delete paths
    pub name: String,
    /// Size in bytes
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

impl From<StoredFile> for FileResponse {
    fn from(file: StoredFile) -> Self {
        Self {
            name: file.name,
            size: file.size,
            last_modified: file.last_modified,
        }
    }
}

/// Outcome of a mutation (upload, rename, delete), also used for every error body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub success: bool,
    /// Human-readable message, suitable for showing to the user as-is
    pub message: String,
    /// The stored file, present on successful uploads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileResponse>,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            file: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<FileResponse>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Body of `PUT /files/{oldname}`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    /// Optional at the type level so a missing field is reported as 400 rather than 422
    #[serde(default)]
    pub new_name: Option<String>,
}
