//! HTTP API: route handlers and their request/response models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures
//!
//! # Routes
//!
//! - `GET /files`: list stored files
//! - `POST /upload`: upload one file (multipart field `file`)
//! - `GET /download/{filename}`: stream a file
//! - `DELETE /files/{filename}`: delete a file
//! - `PUT /files/{oldname}`: rename a file
//!
//! All endpoints are documented with `utoipa`; the rendered reference lives at `/docs`.

pub mod handlers;
pub mod models;
