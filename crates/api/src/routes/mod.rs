pub mod health;
pub mod products;
pub mod upload;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree, mounted both under `/api/v1` and at the root.
///
/// Route hierarchy:
///
/// ```text
/// /products                          list, create
/// /products/bulk-delete              delete all (DELETE)
/// /products/upload-chunk             store one chunk (POST)
/// /products/upload-finalize          assemble chunks, start import (POST)
/// /products/{id}                     get, replace, update, delete
///
/// /upload                            upload CSV, start import (POST)
/// /upload/status/{job_id}            poll import job
///
/// /webhooks/{id}/test                test stub (GET, POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/upload", upload::router())
        .nest("/webhooks", webhooks::router())
}
