//! Route definitions for the `/products` resource, including chunked uploads.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{chunk, product};
use crate::state::AppState;

/// Routes mounted at `/products`.
///
/// ```text
/// GET    /                    -> list
/// POST   /                    -> create
/// DELETE /bulk-delete         -> bulk_delete
/// POST   /upload-chunk        -> upload_chunk
/// POST   /upload-finalize     -> finalize_upload
/// GET    /{id}                -> get_by_id
/// PUT    /{id}                -> replace
/// PATCH  /{id}                -> update
/// DELETE /{id}                -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(product::list).post(product::create))
        .route("/bulk-delete", delete(product::bulk_delete))
        .route("/upload-chunk", post(chunk::upload_chunk))
        .route("/upload-finalize", post(chunk::finalize_upload))
        .route(
            "/{id}",
            get(product::get_by_id)
                .put(product::replace)
                .patch(product::update)
                .delete(product::delete),
        )
}
