//! Domain logic for the product catalog.
//!
//! Everything here is pure: no database, no HTTP. The `db`, `worker` and
//! `api` crates build on these types and rules.

pub mod error;
pub mod import_status;
pub mod pagination;
pub mod product_csv;
pub mod sku;
pub mod types;
pub mod uploads;
pub mod validation;
