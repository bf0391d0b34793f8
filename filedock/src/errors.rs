use crate::api::models::files::StatusResponse;
use crate::metrics;
use crate::storage::StoreError;
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Malformed request that never reached the file store
    #[error("{message}")]
    BadRequest { message: String },

    /// Upload exceeded the configured body limit
    #[error("{message}")]
    PayloadTooLarge { message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// File store operation error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Map a multipart parsing error, keeping body-limit violations distinct
    pub fn from_multipart(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Error::PayloadTooLarge { message: err.body_text() }
        } else {
            Error::BadRequest {
                message: format!("Failed to parse multipart data: {}", err.body_text()),
            }
        }
    }

    /// Map a failed upload. A write failure caused by the request body hitting the size limit is
    /// the client's fault and is reported as 413, not as a server-side write error.
    pub fn from_upload(err: StoreError) -> Self {
        if let StoreError::WriteFailure { source, .. } = &err
            && let Some(multipart_err) = source.get_ref().and_then(|e| e.downcast_ref::<MultipartError>())
            && multipart_err.status() == StatusCode::PAYLOAD_TOO_LARGE
        {
            return Error::PayloadTooLarge {
                message: multipart_err.body_text(),
            };
        }
        Error::Store(err)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Store(store_err) => match store_err {
                StoreError::InvalidName { .. } | StoreError::PathTraversal { .. } | StoreError::NoFilePresent => StatusCode::BAD_REQUEST,
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::AlreadyExists { .. } => StatusCode::CONFLICT,
                StoreError::WriteFailure { .. }
                | StoreError::ReadFailure { .. }
                | StoreError::DeleteFailure { .. }
                | StoreError::RenameFailure { .. }
                | StoreError::StoreUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking paths or OS error details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } => message.clone(),
            Error::PayloadTooLarge { message } => message.clone(),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Store(store_err) => match store_err {
                StoreError::InvalidName { .. } => "Invalid filename provided.".to_string(),
                StoreError::PathTraversal { .. } => "Attempted to access a restricted path.".to_string(),
                StoreError::NotFound { .. } => "File not found.".to_string(),
                StoreError::NoFilePresent => "No file was uploaded.".to_string(),
                StoreError::WriteFailure { .. } => "Could not save the uploaded file.".to_string(),
                StoreError::ReadFailure { .. } => "Could not read the requested file.".to_string(),
                StoreError::DeleteFailure { .. } => "Error deleting file.".to_string(),
                StoreError::RenameFailure { .. } => "Error renaming file.".to_string(),
                StoreError::AlreadyExists { name } => format!("A file named '{name}' already exists."),
                StoreError::StoreUnavailable { .. } => "Could not retrieve files.".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Store(store_err) => {
                metrics::record_store_error(store_err.kind());
                if store_err.is_client_error() {
                    tracing::debug!("Client error: {}", self);
                } else {
                    tracing::error!("File store error: {}", with_source(store_err));
                }
            }
            Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::BadRequest { .. } | Error::PayloadTooLarge { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        (status, Json(StatusResponse::failure(self.user_message()))).into_response()
    }
}

/// Render a store error together with its I/O cause for logs
fn with_source(err: &StoreError) -> String {
    match std::error::Error::source(err) {
        Some(source) => format!("{err}: {source}"),
        None => err.to_string(),
    }
}

/// Type alias for handler results
pub type Result<T> = std::result::Result<T, Error>;
