//! # filedock: a small HTTP file store
//!
//! `filedock` serves a single directory over HTTP. Clients can list its files, upload new ones
//! with multipart requests, stream them back, rename them and delete them. Every client-supplied
//! name is resolved through [`storage::StorageRoot::resolve`] before it touches the filesystem,
//! so no request can read or write outside the configured storage root.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum). Handlers in [`api`] translate
//! requests into calls on the [`storage::FileStore`] trait, whose local-disk implementation
//! lives in [`storage`]. Failures are reported as [`storage::StoreError`] and mapped onto HTTP
//! responses by [`errors::Error`]; every response body, success or failure, carries
//! `{"success": bool, "message": string}`.
//!
//! Uploaded files are stored as `<millis>-<nonce>-<original name>` (see [`storage::naming`]), so
//! two uploads of `report.pdf` never overwrite each other.
//!
//! ## Endpoints
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `GET` | `/files` | List files, sorted case-insensitively |
//! | `POST` | `/upload` | Upload the multipart field `file` |
//! | `GET` | `/download/{filename}` | Stream a file |
//! | `DELETE` | `/files/{filename}` | Delete a file |
//! | `PUT` | `/files/{oldname}` | Rename a file, body `{"newName": "..."}` |
//! | `GET` | `/healthz` | Liveness check |
//! | `GET` | `/docs`, `/api-docs/openapi.json` | API documentation |
//! | `GET` | `/internal/metrics` | Prometheus metrics, when enabled |
//!
//! Anything else is served from `public_dir` when one is configured.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use filedock::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = filedock::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     filedock::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod errors;
mod metrics;
pub mod openapi;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
mod test;
#[cfg(test)]
mod test_utils;

use crate::{config::CorsOrigin, openapi::ApiDoc, storage::FileStore};
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, Any, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .store(storage::create_file_store(&config.storage_root).await?)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn FileStore>,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.cors;

    let mut cors = if cors_config
        .allowed_origins
        .iter()
        .any(|origin| matches!(origin, CorsOrigin::Wildcard))
    {
        CorsLayer::new().allow_origin(Any)
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Origins never carry a trailing slash, Url always renders one for an empty path
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(cors_config.allow_credentials)
    };

    // Mirroring rather than `*` stays valid when credentials are allowed
    cors = cors
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());
    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// Layers, outermost first: tracing, metrics (when enabled), CORS. The upload route carries its
/// own body limit so the rest of the API keeps axum's default.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    use api::handlers::files;

    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes());

    let file_routes = Router::new()
        .route("/files", get(files::list_files))
        .route("/files/{filename}", delete(files::delete_file).put(files::rename_file))
        .route("/upload", post(files::upload_file).layer(upload_limit))
        .route("/download/{filename}", get(files::download_file))
        .with_state(state.clone());

    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(file_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    if let Some(public_dir) = &state.config.public_dir {
        debug!(public_dir = %public_dir.display(), "Serving static files for unmatched routes");
        router = router.fallback_service(ServeDir::new(public_dir));
    }

    let mut router = router.layer(create_cors_layer(&state.config)?);

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

        // HTTP metrics from axum-prometheus, followed by the file operation counters
        router = router
            .route(
                "/internal/metrics",
                get(|| async move {
                    use prometheus::{Encoder, TextEncoder};

                    let mut body = metric_handle.render();
                    let mut buffer = vec![];
                    match TextEncoder::new().encode(&prometheus::gather(), &mut buffer) {
                        Ok(()) => body.push_str(&String::from_utf8_lossy(&buffer)),
                        Err(e) => tracing::error!("Failed to encode file metrics: {}", e),
                    }
                    body
                }),
            )
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct.
///
/// 1. **Create**: [`Application::new`] opens the storage root and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles requests until the
///    shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance, creating the storage root if needed
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting filedock with configuration: {:#?}", config);

        let store = storage::create_file_store(&config.storage_root).await?;
        let state = AppState::builder().config(config.clone()).store(store).build();
        let router = build_router(&state)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "filedock listening on http://{}, storing files in {}",
            bind_addr,
            self.config.storage_root.display()
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
