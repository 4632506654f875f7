//! Handlers for the `/products` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog_core::error::CoreError;
use catalog_core::pagination::{page_window, parse_active_flag};
use catalog_core::types::DbId;
use catalog_core::validation::validate_input;
use catalog_db::models::product::{
    CreateProduct, Product, ProductFilter, ProductPage, UpdateProduct,
};
use catalog_db::repositories::ProductRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::query::ProductListParams;
use crate::state::AppState;

/// Returned by `create` when the SKU is already in the catalog.
#[derive(Debug, Serialize)]
pub struct ExistingProduct {
    pub message: &'static str,
    pub product: Product,
}

/// Returned by `bulk_delete`.
#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub message: &'static str,
    pub deleted: u64,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::not_found("Product", id))
}

/// GET /api/v1/products
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> AppResult<Json<ProductPage>> {
    let window = page_window(params.page, params.page_size);
    let filter = ProductFilter {
        sku: params.sku,
        name: params.name,
        active: parse_active_flag(params.active.as_deref()),
        limit: window.limit,
        offset: window.offset,
    };

    let rows = ProductRepo::list(&state.pool, &filter).await?;
    let total = ProductRepo::count(&state.pool, &filter).await?;
    Ok(Json(ProductPage { rows, total }))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Product>> {
    let product = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(product))
}

/// POST /api/v1/products
///
/// An existing SKU is not an error: the stored product is returned with
/// `200` instead of `201`.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProduct>,
) -> AppResult<Response> {
    validate_input(&input)?;

    if let Some(product) = ProductRepo::find_by_sku(&state.pool, &input.sku).await? {
        tracing::debug!(product_id = product.id, sku = %product.sku, "Create hit existing SKU");
        let body = ExistingProduct {
            message: "Product with this SKU already exists",
            product,
        };
        return Ok((StatusCode::OK, Json(body)).into_response());
    }

    let product = ProductRepo::create(&state.pool, &input).await?;
    tracing::info!(product_id = product.id, sku = %product.sku, "Product created");
    Ok((StatusCode::CREATED, Json(product)).into_response())
}

/// PUT /api/v1/products/{id}
///
/// Full replacement: `name` and `sku` are required and an omitted
/// description is cleared.
pub async fn replace(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateProduct>,
) -> AppResult<Json<Product>> {
    validate_input(&input)?;
    apply_update(&state, id, &UpdateProduct::from(input)).await
}

/// PATCH /api/v1/products/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProduct>,
) -> AppResult<Json<Product>> {
    validate_input(&input)?;
    apply_update(&state, id, &input).await
}

async fn apply_update(state: &AppState, id: DbId, input: &UpdateProduct) -> AppResult<Json<Product>> {
    if let Some(sku) = input.sku.as_deref() {
        if ProductRepo::sku_taken_by_other(&state.pool, sku, id).await? {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Another product already uses SKU '{}'",
                sku.trim()
            ))));
        }
    }

    let product = ProductRepo::update(&state.pool, id, input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(product))
}

/// DELETE /api/v1/products/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if ProductRepo::delete(&state.pool, id).await? {
        tracing::info!(product_id = id, "Product deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// DELETE /api/v1/products/bulk-delete
pub async fn bulk_delete(State(state): State<AppState>) -> AppResult<Json<BulkDeleteResponse>> {
    let deleted = ProductRepo::delete_all(&state.pool).await?;
    tracing::warn!(deleted, "All products deleted");
    Ok(Json(BulkDeleteResponse {
        message: "All products deleted successfully",
        deleted,
    }))
}
