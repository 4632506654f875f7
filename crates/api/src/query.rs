//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for `GET /products`.
///
/// `pageSize` keeps the camelCase name clients already send. Values are
/// clamped by `catalog_core::pagination`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub page: Option<i64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
    pub sku: Option<String>,
    pub name: Option<String>,
    /// Raw flag; see `catalog_core::pagination::parse_active_flag`.
    pub active: Option<String>,
}
