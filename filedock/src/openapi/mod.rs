//! OpenAPI documentation for the file API.
//!
//! The document is served as JSON at `/api-docs/openapi.json` and rendered with Scalar at `/docs`.

use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "filedock API",
        description = "List, upload, download, rename and delete files in a single storage directory."
    ),
    paths(
        api::handlers::files::list_files,
        api::handlers::files::upload_file,
        api::handlers::files::download_file,
        api::handlers::files::delete_file,
        api::handlers::files::rename_file,
    ),
    components(
        schemas(
            api::models::files::FileResponse,
            api::models::files::StatusResponse,
            api::models::files::RenameRequest,
        )
    ),
    tags(
        (name = "files", description = "Files live in one flat directory. Names returned by `GET /files` are the \
stored names; uploads get a generated `<millis>-<nonce>-` prefix so identically named uploads never collide.

Every failure response has the shape `{\"success\": false, \"message\": \"...\"}`.")
    )
)]
pub struct ApiDoc;
