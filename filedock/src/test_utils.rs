//! Shared helpers for router-level tests.

use std::path::Path;

use axum_test::{
    TestServer,
    multipart::{MultipartForm, Part},
};

use crate::config::Config;

/// Config rooted in `dir`, with metrics off (the Prometheus recorder can only be installed once
/// per process) and no static file fallback.
pub fn create_test_config(dir: &Path) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        storage_root: dir.join("uploads"),
        public_dir: None,
        enable_metrics: false,
        ..Default::default()
    }
}

pub async fn create_test_app(config: Config) -> TestServer {
    crate::Application::new(config)
        .await
        .expect("Failed to create application")
        .into_test_server()
}

/// Multipart form with a single `file` part
pub fn file_form(file_name: &str, content: impl Into<Vec<u8>>) -> MultipartForm {
    let part = Part::bytes(content.into())
        .file_name(file_name.to_string())
        .mime_type("application/octet-stream");
    MultipartForm::new().add_part("file", part)
}
