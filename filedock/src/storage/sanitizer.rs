//! Maps untrusted client filenames onto paths inside the storage root.
//!
//! Resolution is purely lexical: the raw name is split into path components, `.` segments and
//! repeated separators are dropped, and anything that could move the result outside the root
//! (`..`, a leading `/`, a Windows drive or UNC prefix) is rejected as
//! [`StoreError::PathTraversal`]. The namespace is flat, so a name must normalize to exactly one
//! component; anything else is [`StoreError::InvalidName`].
//!
//! Containment is checked with [`Path::starts_with`], which compares whole components. A root of
//! `/srv/uploads` therefore does not contain `/srv/uploadsEvil/x`, which a plain string-prefix
//! test would accept.

use std::path::{Component, Path, PathBuf};

use crate::storage::errors::{Result, StoreError};

/// The single directory that holds every managed file.
///
/// Fixed at startup and injected into the store; there is no process-global root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoot {
    path: PathBuf,
}

/// A path that has been proven to live directly inside a [`StorageRoot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafePath {
    name: String,
    path: PathBuf,
}

impl SafePath {
    /// Normalized file name (the single component below the root)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for SafePath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl StorageRoot {
    /// Create the directory if it is absent and pin it to its canonical absolute path.
    ///
    /// Canonicalizing once here means later containment checks compare like with like, even if
    /// the configured path was relative or went through a symlink.
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        tokio::fs::create_dir_all(path).await?;
        let canonical = tokio::fs::canonicalize(path).await?;
        Ok(Self::from_canonical(canonical))
    }

    /// Wrap a path that is already absolute and canonical. No filesystem access.
    pub fn from_canonical(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if `candidate` is strictly below the root (the root itself is not "inside").
    pub fn contains(&self, candidate: &Path) -> bool {
        candidate != self.path && candidate.starts_with(&self.path)
    }

    /// Resolve a client-supplied name to a path inside the root.
    pub fn resolve(&self, raw_name: &str) -> Result<SafePath> {
        if raw_name.is_empty() || raw_name.contains('\0') {
            return Err(StoreError::InvalidName {
                name: raw_name.to_string(),
            });
        }

        let mut normalized = PathBuf::new();
        for component in Path::new(raw_name).components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(StoreError::PathTraversal {
                        name: raw_name.to_string(),
                    });
                }
            }
        }

        // Flat namespace: "." resolves to the root itself, "a/b" to a subdirectory
        let mut parts = normalized.components();
        let name = match (parts.next(), parts.next()) {
            (Some(Component::Normal(part)), None) => part.to_string_lossy().into_owned(),
            _ => {
                return Err(StoreError::InvalidName {
                    name: raw_name.to_string(),
                });
            }
        };

        let path = self.path.join(&name);
        if !self.contains(&path) {
            return Err(StoreError::PathTraversal {
                name: raw_name.to_string(),
            });
        }

        Ok(SafePath { name, path })
    }
}
