//! File operation counters, registered in the default `prometheus` registry.

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, register_int_counter, register_int_counter_vec};

static UPLOADS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("filedock_uploads_total", "Total files stored via upload")
        .expect("Failed to register filedock_uploads_total metric")
});

static UPLOADED_BYTES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("filedock_uploaded_bytes_total", "Total bytes written by uploads")
        .expect("Failed to register filedock_uploaded_bytes_total metric")
});

static DOWNLOADS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("filedock_downloads_total", "Total downloads started")
        .expect("Failed to register filedock_downloads_total metric")
});

static STORE_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "filedock_store_errors_total",
        "File store operations that failed, by error kind",
        &["kind"]
    )
    .expect("Failed to register filedock_store_errors_total metric")
});

/// Record a completed upload of `bytes` bytes
pub fn record_upload(bytes: u64) {
    UPLOADS.inc();
    UPLOADED_BYTES.inc_by(bytes);
}

pub fn record_download() {
    DOWNLOADS.inc();
}

/// Record a failed store operation, labelled with [`crate::storage::StoreError::kind`]
pub fn record_store_error(kind: &str) {
    STORE_ERRORS.with_label_values(&[kind]).inc();
}
