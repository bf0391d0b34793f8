use crate::AppState;
use crate::api::models::files::{FileResponse, RenameRequest, StatusResponse};
use crate::errors::{Error, Result};
use crate::metrics;
use crate::storage::{StoreError, naming};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State, multipart::MultipartRejection, rejection::JsonRejection},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use futures::{StreamExt, TryStreamExt};
use tracing::{debug, instrument};

#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    summary = "List files",
    description = "List every file in the storage root, sorted case-insensitively by name.",
    responses(
        (status = 200, description = "Current files", body = [FileResponse]),
        (status = 500, description = "Storage root could not be read", body = StatusResponse)
    )
)]
#[instrument(skip_all)]
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<FileResponse>>> {
    let files = state.store.list().await?;
    debug!(count = files.len(), "Listed files");
    Ok(Json(files.into_iter().map(FileResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    summary = "Upload file",
    description = "Upload a single file in the multipart field `file`. The file is stored under a generated name \
                   that keeps the original name as a suffix.",
    request_body(
        content_type = "multipart/form-data",
        description = "Multipart form with a `file` part"
    ),
    responses(
        (status = 200, description = "File uploaded", body = StatusResponse),
        (status = 400, description = "No file in the request", body = StatusResponse),
        (status = 413, description = "Upload exceeds the configured size limit", body = StatusResponse),
        (status = 500, description = "File could not be written", body = StatusResponse)
    )
)]
#[instrument(skip_all)]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<StatusResponse>> {
    // A request that is not multipart at all carries no file either
    let mut multipart = multipart.map_err(|e| {
        debug!("Upload without a multipart body: {}", e.body_text());
        StoreError::NoFilePresent
    })?;

    while let Some(field) = multipart.next_field().await.map_err(Error::from_multipart)? {
        if field.name() != Some("file") {
            debug!(field = ?field.name(), "Ignoring non-file multipart field");
            continue;
        }
        // A `file` part without a filename is a plain form value, not an upload
        let Some(original_name) = field.file_name().map(str::to_owned) else {
            continue;
        };

        debug!(original_name = %original_name, "Receiving upload");
        let body = field.map_err(std::io::Error::other).boxed();
        let stored = state.store.store(&original_name, body).await.map_err(Error::from_upload)?;

        metrics::record_upload(stored.size);
        let message = format!("File '{}' uploaded successfully.", naming::original_name(&stored.name));
        return Ok(Json(StatusResponse::success(message).with_file(stored)));
    }

    Err(StoreError::NoFilePresent.into())
}

#[utoipa::path(
    get,
    path = "/download/{filename}",
    tag = "files",
    summary = "Download file",
    description = "Stream a file. The `Content-Disposition` header carries the original upload name.",
    params(("filename" = String, Path, description = "Stored file name")),
    responses(
        (status = 200, description = "File contents", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 400, description = "Invalid or restricted file name", body = StatusResponse),
        (status = 404, description = "File not found", body = StatusResponse)
    )
)]
#[instrument(skip(state))]
pub async fn download_file(State(state): State<AppState>, Path(filename): Path<String>) -> Result<Response> {
    let download = state.store.fetch(&filename).await?;

    let hint = naming::original_name(&download.file.name);
    let mime = mime_guess::from_path(hint).first_or_octet_stream();
    let content_type = HeaderValue::from_str(mime.as_ref()).unwrap_or(HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&content_disposition(hint)).map_err(|e| Error::Internal {
        operation: format!("build download headers: {e}"),
    })?;

    metrics::record_download();
    let headers = [
        (header::CONTENT_TYPE, content_type),
        (header::CONTENT_LENGTH, HeaderValue::from(download.file.size)),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, Body::from_stream(download.body)).into_response())
}

#[utoipa::path(
    delete,
    path = "/files/{filename}",
    tag = "files",
    summary = "Delete file",
    params(("filename" = String, Path, description = "Stored file name")),
    responses(
        (status = 200, description = "File deleted", body = StatusResponse),
        (status = 400, description = "Invalid or restricted file name", body = StatusResponse),
        (status = 404, description = "File not found", body = StatusResponse),
        (status = 500, description = "File could not be deleted", body = StatusResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_file(State(state): State<AppState>, Path(filename): Path<String>) -> Result<Json<StatusResponse>> {
    state.store.remove(&filename).await?;
    Ok(Json(StatusResponse::success(format!("File '{filename}' deleted successfully."))))
}

#[utoipa::path(
    put,
    path = "/files/{oldname}",
    tag = "files",
    summary = "Rename file",
    description = "Rename a file. Renaming onto an existing name is refused with 409.",
    params(("oldname" = String, Path, description = "Current stored file name")),
    request_body = RenameRequest,
    responses(
        (status = 200, description = "File renamed", body = StatusResponse),
        (status = 400, description = "Missing, invalid or restricted new name", body = StatusResponse),
        (status = 404, description = "Source file not found", body = StatusResponse),
        (status = 409, description = "A file with the new name already exists", body = StatusResponse),
        (status = 500, description = "File could not be renamed", body = StatusResponse)
    )
)]
#[instrument(skip(state, payload))]
pub async fn rename_file(
    State(state): State<AppState>,
    Path(oldname): Path<String>,
    payload: std::result::Result<Json<RenameRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>> {
    let Json(request) = payload.map_err(|e| Error::BadRequest {
        message: format!("Invalid rename request: {}", e.body_text()),
    })?;
    let new_name = request
        .new_name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| Error::BadRequest {
            message: "New filename not provided.".to_string(),
        })?;

    state.store.rename(&oldname, &new_name).await?;
    Ok(Json(StatusResponse::success(format!("File renamed to '{new_name}'."))))
}

/// `attachment` disposition with an ASCII fallback name and an RFC 5987 UTF-8 name.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' { c } else { '_' })
        .collect();

    let mut encoded = String::with_capacity(filename.len());
    for byte in filename.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
