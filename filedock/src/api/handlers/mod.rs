//! HTTP request handlers.
//!
//! Handlers validate and extract the request, call into the [`crate::storage::FileStore`] held in
//! [`crate::AppState`], and return either a JSON body or a [`crate::errors::Error`], which renders
//! as `{"success": false, "message": ...}` with the matching status code.
//!
//! - [`files`]: listing, upload, download, rename and delete

pub mod files;
