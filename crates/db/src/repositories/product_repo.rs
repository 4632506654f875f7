//! Repository for the `products` table.
//!
//! SKU comparisons always go through `LOWER(sku)` so they hit the
//! `uq_products_sku_lower` expression index.

use catalog_core::product_csv::ProductRow;
use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::product::{
    blank_to_none, CreateProduct, Product, ProductFilter, UpdateProduct, UpsertCounts,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, sku, description, is_active, created_at, updated_at";

/// Provides CRUD and bulk-import operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product, returning the created row.
    ///
    /// Name and SKU are stored trimmed; a blank description becomes NULL.
    /// If `is_active` is `None`, defaults to `true`.
    pub async fn create(pool: &PgPool, input: &CreateProduct) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (name, sku, description, is_active)
             VALUES ($1, $2, $3, COALESCE($4, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(input.name.trim())
            .bind(input.sku.trim())
            .bind(blank_to_none(input.description.as_deref()))
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a product by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a product whose SKU matches `sku` ignoring case and padding.
    pub async fn find_by_sku(pool: &PgPool, sku: &str) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE LOWER(sku) = LOWER($1)");
        sqlx::query_as::<_, Product>(&query)
            .bind(sku.trim())
            .fetch_optional(pool)
            .await
    }

    /// Whether a product other than `exclude_id` already uses `sku`.
    pub async fn sku_taken_by_other(
        pool: &PgPool,
        sku: &str,
        exclude_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM products WHERE LOWER(sku) = LOWER($1) AND id <> $2)",
        )
        .bind(sku.trim())
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// List one page of products matching `filter`, ordered by ID.
    pub async fn list(pool: &PgPool, filter: &ProductFilter) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products \
             WHERE {FILTER_CLAUSE} \
             ORDER BY id ASC \
             LIMIT $4 OFFSET $5"
        );
        let (sku, name) = filter_patterns(filter);
        sqlx::query_as::<_, Product>(&query)
            .bind(sku)
            .bind(name)
            .bind(filter.active)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Count all products matching `filter`, ignoring the page window.
    pub async fn count(pool: &PgPool, filter: &ProductFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM products WHERE {FILTER_CLAUSE}");
        let (sku, name) = filter_patterns(filter);
        sqlx::query_scalar::<_, i64>(&query)
            .bind(sku)
            .bind(name)
            .bind(filter.active)
            .fetch_one(pool)
            .await
    }

    /// Update a product. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                name = COALESCE($2, name),
                sku = COALESCE($3, sku),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.sku.as_deref().map(str::trim))
            .bind(input.description.is_some())
            .bind(blank_to_none(input.description.as_deref()))
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a product by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every product. Returns the number of rows removed.
    pub async fn delete_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products").execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Upsert imported rows by SKU inside a single transaction.
    ///
    /// Existing products (matched case-insensitively) get the imported
    /// name and description and are re-activated; their stored SKU is
    /// kept. Rows are applied in order, so a SKU repeated within the batch
    /// ends up with the last row's values.
    pub async fn upsert_batch(
        pool: &PgPool,
        rows: &[ProductRow],
    ) -> Result<UpsertCounts, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut counts = UpsertCounts::default();

        for row in rows {
            // xmax is 0 only for a freshly inserted tuple.
            let inserted = sqlx::query_scalar::<_, bool>(
                "INSERT INTO products (name, sku, description, is_active)
                 VALUES ($1, $2, $3, TRUE)
                 ON CONFLICT ((LOWER(sku))) DO UPDATE SET
                    name = EXCLUDED.name,
                    description = EXCLUDED.description,
                    is_active = TRUE
                 RETURNING (xmax = 0)",
            )
            .bind(&row.name)
            .bind(&row.sku)
            .bind(&row.description)
            .fetch_one(&mut *tx)
            .await?;

            if inserted {
                counts.created += 1;
            } else {
                counts.updated += 1;
            }
        }

        tx.commit().await?;
        Ok(counts)
    }
}

/// Shared `WHERE` clause for [`ProductFilter`]; binds `$1` sku pattern,
/// `$2` name pattern, `$3` active flag. A NULL bind disables its condition.
const FILTER_CLAUSE: &str = "($1::TEXT IS NULL OR sku ILIKE $1) \
     AND ($2::TEXT IS NULL OR name ILIKE $2) \
     AND ($3::BOOLEAN IS NULL OR is_active = $3)";

/// ILIKE patterns for the non-blank text filters.
fn filter_patterns(filter: &ProductFilter) -> (Option<String>, Option<String>) {
    let pattern = |term: &Option<String>| {
        term.as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(like_pattern)
    };
    (pattern(&filter.sku), pattern(&filter.name))
}

/// Build a `%term%` pattern with LIKE metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
