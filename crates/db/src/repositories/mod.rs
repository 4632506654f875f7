//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod import_job_repo;
pub mod product_repo;

pub use import_job_repo::ImportJobRepo;
pub use product_repo::ProductRepo;
