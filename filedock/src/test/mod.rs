//! Router-level tests: every request goes through the full middleware stack into a real storage
//! root under a temporary directory.

use std::path::PathBuf;

use axum::http::{HeaderValue, StatusCode, header};
use serde_json::{Value, json};

use crate::api::models::files::{FileResponse, StatusResponse};
use crate::test_utils::{create_test_app, create_test_config, file_form};

fn uploads(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("uploads")
}

fn listed_names(files: &[FileResponse]) -> Vec<&str> {
    files.iter().map(|f| f.name.as_str()).collect()
}

#[test_log::test(tokio::test)]
async fn test_upload_list_download_flow() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;

    let content: Vec<u8> = (0..1024u32).map(|i| (i % 251) as u8).collect();
    let response = server.post("/upload").multipart(file_form("report.pdf", content.clone())).await;
    response.assert_status_ok();

    let body: StatusResponse = response.json();
    assert!(body.success);
    assert_eq!(body.message, "File 'report.pdf' uploaded successfully.");
    let stored = body.file.expect("upload response should carry the stored file");
    assert!(stored.name.ends_with("-report.pdf"), "unexpected stored name {}", stored.name);
    assert_eq!(stored.size, 1024);

    let files: Vec<FileResponse> = server.get("/files").await.json();
    assert_eq!(listed_names(&files), [stored.name.as_str()]);
    assert_eq!(files[0].size, 1024);

    let download = server.get(&format!("/download/{}", stored.name)).await;
    download.assert_status_ok();
    assert_eq!(download.as_bytes().as_ref(), content.as_slice());
    assert_eq!(download.header(header::CONTENT_TYPE), "application/pdf");
    assert_eq!(download.header(header::CONTENT_LENGTH), "1024");
    assert_eq!(
        download.header(header::CONTENT_DISPOSITION),
        "attachment; filename=\"report.pdf\"; filename*=UTF-8''report.pdf"
    );
}

#[test_log::test(tokio::test)]
async fn test_same_name_uploads_are_kept_apart() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;

    server.post("/upload").multipart(file_form("x.txt", "first")).await.assert_status_ok();
    server.post("/upload").multipart(file_form("x.txt", "second")).await.assert_status_ok();

    let files: Vec<FileResponse> = server.get("/files").await.json();
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f.name.ends_with("-x.txt")));
    assert_ne!(files[0].name, files[1].name);
}

#[test_log::test(tokio::test)]
async fn test_listing_is_sorted_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;

    std::fs::write(uploads(&dir).join("Banana.txt"), b"b").unwrap();
    std::fs::write(uploads(&dir).join("apple.txt"), b"a").unwrap();
    std::fs::create_dir(uploads(&dir).join("nested")).unwrap();

    let response = server.get("/files").await;
    response.assert_status_ok();

    let files: Vec<FileResponse> = response.json();
    assert_eq!(listed_names(&files), ["apple.txt", "Banana.txt"]);

    let raw: Value = response.json();
    assert!(raw[0].get("lastModified").is_some());
}

#[test_log::test(tokio::test)]
async fn test_empty_store_lists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;

    let files: Vec<FileResponse> = server.get("/files").await.json();
    assert!(files.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_upload_without_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;

    let form = axum_test::multipart::MultipartForm::new().add_text("description", "no file here");
    let response = server.post("/upload").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>(), json!({ "success": false, "message": "No file was uploaded." }));

    // Not multipart at all
    let response = server.post("/upload").text("plain body").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<StatusResponse>().message, "No file was uploaded.");
}

#[test_log::test(tokio::test)]
async fn test_upload_over_limit_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(dir.path());
    config.limits.max_upload_bytes = 1024;
    let server = create_test_app(config).await;

    let response = server.post("/upload").multipart(file_form("big.bin", vec![7u8; 8192])).await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!response.json::<StatusResponse>().success);
}

#[test_log::test(tokio::test)]
async fn test_upload_strips_client_directories() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;

    let response = server.post("/upload").multipart(file_form("../../etc/passwd", "x")).await;
    response.assert_status_ok();

    let stored = response.json::<StatusResponse>().file.unwrap();
    assert!(stored.name.ends_with("-passwd"));
    assert!(uploads(&dir).join(&stored.name).is_file());
}

#[test_log::test(tokio::test)]
async fn test_download_errors() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;
    std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();

    let response = server.get("/download/nope.txt").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>(), json!({ "success": false, "message": "File not found." }));

    let response = server.get("/download/..%2Fsecret.txt").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<StatusResponse>().message, "Attempted to access a restricted path.");
}

#[test_log::test(tokio::test)]
async fn test_download_hint_keeps_dated_user_names() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;
    std::fs::write(uploads(&dir).join("2024-01-notes.txt"), b"notes").unwrap();

    let download = server.get("/download/2024-01-notes.txt").await;
    download.assert_status_ok();
    assert_eq!(
        download.header(header::CONTENT_DISPOSITION),
        "attachment; filename=\"2024-01-notes.txt\"; filename*=UTF-8''2024-01-notes.txt"
    );
}

#[test_log::test(tokio::test)]
async fn test_delete_file() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;
    std::fs::write(uploads(&dir).join("a.txt"), b"a").unwrap();

    let response = server.delete("/files/a.txt").await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "success": true, "message": "File 'a.txt' deleted successfully." })
    );
    assert!(!uploads(&dir).join("a.txt").exists());

    let response = server.delete("/files/a.txt").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<StatusResponse>().message, "File not found.");
}

#[test_log::test(tokio::test)]
async fn test_delete_traversal_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;
    std::fs::write(dir.path().join("outside.txt"), b"keep").unwrap();

    let response = server.delete("/files/..%2Foutside.txt").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(dir.path().join("outside.txt").exists());
}

#[test_log::test(tokio::test)]
async fn test_directories_cannot_be_deleted_or_renamed() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;
    std::fs::create_dir(uploads(&dir).join("sub")).unwrap();

    let response = server.delete("/files/sub").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>(), json!({ "success": false, "message": "File not found." }));

    let response = server.put("/files/sub").json(&json!({ "newName": "sub2" })).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<StatusResponse>().message, "File not found.");

    assert!(uploads(&dir).join("sub").is_dir());
    assert!(!uploads(&dir).join("sub2").exists());
}

#[test_log::test(tokio::test)]
async fn test_rename_file() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;
    std::fs::write(uploads(&dir).join("a.txt"), b"content").unwrap();

    let response = server.put("/files/a.txt").json(&json!({ "newName": "b.txt" })).await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "success": true, "message": "File renamed to 'b.txt'." })
    );

    let files: Vec<FileResponse> = server.get("/files").await.json();
    assert_eq!(listed_names(&files), ["b.txt"]);
    assert_eq!(std::fs::read(uploads(&dir).join("b.txt")).unwrap(), b"content");
}

#[test_log::test(tokio::test)]
async fn test_rename_onto_existing_file_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;
    std::fs::write(uploads(&dir).join("a.txt"), b"a").unwrap();
    std::fs::write(uploads(&dir).join("b.txt"), b"b").unwrap();

    let response = server.put("/files/a.txt").json(&json!({ "newName": "b.txt" })).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<StatusResponse>().message, "A file named 'b.txt' already exists.");

    assert_eq!(std::fs::read(uploads(&dir).join("a.txt")).unwrap(), b"a");
    assert_eq!(std::fs::read(uploads(&dir).join("b.txt")).unwrap(), b"b");
}

#[test_log::test(tokio::test)]
async fn test_rename_traversal_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;
    std::fs::write(uploads(&dir).join("a.txt"), b"a").unwrap();

    let response = server
        .put("/files/..%2F..%2Fetc%2Fpasswd")
        .json(&json!({ "newName": "x.txt" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<StatusResponse>().message, "Attempted to access a restricted path.");

    let response = server.put("/files/a.txt").json(&json!({ "newName": "../a.txt" })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(uploads(&dir).join("a.txt").exists());
    assert!(!dir.path().join("a.txt").exists());
}

#[test_log::test(tokio::test)]
async fn test_rename_request_validation() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;
    std::fs::write(uploads(&dir).join("a.txt"), b"a").unwrap();

    let response = server.put("/files/a.txt").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<StatusResponse>().message, "New filename not provided.");

    let response = server.put("/files/a.txt").json(&json!({ "newName": "   " })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<StatusResponse>().message, "New filename not provided.");

    let response = server.put("/files/a.txt").text("newName=b.txt").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(!response.json::<StatusResponse>().success);

    let response = server.put("/files/missing.txt").json(&json!({ "newName": "b.txt" })).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_healthz_and_docs() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;

    let response = server.get("/healthz").await;
    response.assert_status_ok();
    response.assert_text("OK");

    let doc: Value = server.get("/api-docs/openapi.json").await.json();
    assert!(doc["paths"]["/upload"]["post"].is_object());
    assert!(doc["paths"]["/files"]["get"].is_object());

    server.get("/docs").await.assert_status_ok();
}

#[test_log::test(tokio::test)]
async fn test_public_dir_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let public = dir.path().join("public");
    std::fs::create_dir(&public).unwrap();
    std::fs::write(public.join("index.html"), "<h1>filedock</h1>").unwrap();

    let mut config = create_test_config(dir.path());
    config.public_dir = Some(public);
    let server = create_test_app(config).await;

    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("<h1>filedock</h1>");

    // API routes still take precedence
    server.get("/files").await.assert_status_ok();
    server.get("/missing.css").await.assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_cors_allows_any_origin_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(create_test_config(dir.path())).await;

    let response = server
        .get("/files")
        .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:5173"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");
}
