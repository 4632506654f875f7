//! Product entity model and DTOs.

use catalog_core::types::{DbId, Timestamp};
use catalog_core::validation::not_blank;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A product row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new product.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(
        length(max = 255, message = "must be at most 255 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[validate(
        length(max = 255, message = "must be at most 255 characters"),
        custom(function = "not_blank")
    )]
    pub sku: String,
    pub description: Option<String>,
    /// Defaults to `true` if omitted.
    pub is_active: Option<bool>,
}

/// DTO for updating an existing product. All fields are optional.
///
/// A `description` of `""` clears the stored description; omitting it
/// leaves the description unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProduct {
    #[validate(
        length(max = 255, message = "must be at most 255 characters"),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,
    #[validate(
        length(max = 255, message = "must be at most 255 characters"),
        custom(function = "not_blank")
    )]
    pub sku: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl From<CreateProduct> for UpdateProduct {
    /// A full replacement (`PUT`): every field is set, a missing
    /// description clears it.
    fn from(input: CreateProduct) -> Self {
        Self {
            name: Some(input.name),
            sku: Some(input.sku),
            description: Some(input.description.unwrap_or_default()),
            is_active: input.is_active,
        }
    }
}

/// Filters and page window for listing products.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring match on `sku`.
    pub sku: Option<String>,
    /// Case-insensitive substring match on `name`.
    pub name: Option<String>,
    pub active: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

/// One page of products plus the number of rows matching the filter.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub rows: Vec<Product>,
    pub total: i64,
}

/// Outcome of upserting a batch of imported rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertCounts {
    pub created: u64,
    pub updated: u64,
}

/// Trim a free-text field, mapping blank input to `None`.
pub fn blank_to_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
