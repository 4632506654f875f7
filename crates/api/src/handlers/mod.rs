pub mod chunk;
pub mod product;
pub mod upload;
pub mod webhook;
