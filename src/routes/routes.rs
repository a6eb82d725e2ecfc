//! Route table for the attachment server.
//!
//! - `GET /download` - the configured record's file as an attachment
//! - `GET /healthz`  - liveness
//! - `GET /readyz`   - readiness (SQLite + storage backend)

use crate::{
    handlers::{
        download_handlers::download_file,
        health_handlers::{healthz, readyz},
    },
    services::{download_service::DownloadService, storage_service::Storage},
};
use axum::{Router, routing::get};

/// Build the router. State is the `DownloadService` over whichever storage
/// backend the caller injected.
pub fn routes<S: Storage>() -> Router<DownloadService<S>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz::<S>))
        .route("/download", get(download_file::<S>))
}
