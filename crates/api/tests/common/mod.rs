#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use catalog_api::config::ServerConfig;
use catalog_api::router::{build_app, App};
use catalog_api::state::AppState;
use catalog_api::storage::UploadStorage;
use catalog_worker::queue::run_dispatcher;
use catalog_worker::{ImportConfig, ImportQueue};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

/// Build a test `ServerConfig` rooted in `dir`.
///
/// Imports report progress every 2 rows and upsert in batches of 2 so
/// small fixtures still exercise batching.
pub fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:4200".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        upload_dir: dir.path().join("uploads"),
        chunk_dir: dir.path().join("chunks"),
        max_upload_bytes: 10 * 1024 * 1024,
        inline_worker: true,
        import: ImportConfig {
            progress_every: 2,
            batch_size: 2,
        },
    }
}

/// A router over scratch upload directories, plus the in-process import
/// dispatcher when enabled.
pub struct TestApp {
    pub app: App,
    pub pool: PgPool,
    pub storage: UploadStorage,
    cancel: CancellationToken,
    _dir: TempDir,
}

impl TestApp {
    /// A fresh handle to the router; each request consumes one.
    pub fn router(&self) -> App {
        self.app.clone()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Build the full application with the same middleware stack as
/// production and a running import dispatcher.
pub async fn build_test_app(pool: PgPool) -> TestApp {
    build(pool, true).await
}

/// Like [`build_test_app`], but jobs are never picked up.
pub async fn build_test_app_without_worker(pool: PgPool) -> TestApp {
    build(pool, false).await
}

async fn build(pool: PgPool, inline_worker: bool) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir);
    config.inline_worker = inline_worker;

    let storage = UploadStorage::new(&config.upload_dir, &config.chunk_dir);
    storage.ensure_dirs().await.unwrap();

    let cancel = CancellationToken::new();
    let import_queue = if inline_worker {
        let (queue, rx) = ImportQueue::new();
        tokio::spawn(run_dispatcher(
            pool.clone(),
            rx,
            Arc::new(config.import.clone()),
            cancel.clone(),
        ));
        Some(queue)
    } else {
        None
    };

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config),
        storage: storage.clone(),
        import_queue,
    };

    TestApp {
        app: build_app(state),
        pool,
        storage,
        cancel,
        _dir: dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: App, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: App, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: App, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn send_json(
    app: App,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: App, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: App, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn patch_json(app: App, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PATCH, uri, body).await
}

/// POST a urlencoded form. Values must not need percent-encoding.
pub async fn post_form(app: App, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

const BOUNDARY: &str = "catalog-test-boundary";

/// Minimal `multipart/form-data` body builder.
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, contents: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(contents);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

pub async fn post_multipart(app: App, uri: &str, form: MultipartForm) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(form.finish()))
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll `/upload/status/{job_id}` until the job reaches a terminal state.
pub async fn wait_for_job(test: &TestApp, job_id: &str) -> serde_json::Value {
    for _ in 0..400 {
        let response = get(test.router(), &format!("/api/v1/upload/status/{job_id}")).await;
        let status = response.status();
        let json = body_json(response).await;
        if status == StatusCode::OK
            && matches!(json["status"].as_str(), Some("SUCCESS" | "FAILURE"))
        {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("import job {job_id} did not finish");
}

/// Create a product through the API and return its JSON.
pub async fn create_product(test: &TestApp, name: &str, sku: &str) -> serde_json::Value {
    let response = post_json(
        test.router(),
        "/api/v1/products",
        serde_json::json!({"name": name, "sku": sku}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}
