//! Prometheus metrics for file operations.
//!
//! HTTP-level metrics (request counts, latencies) come from `axum-prometheus` and are wired up in
//! [`crate::build_router`]. The counters here cover what the HTTP layer cannot see: bytes
//! written, and which store error kinds are occurring.

mod files;

pub use files::{record_download, record_store_error, record_upload};
