//! Background CSV import pipeline.
//!
//! - [`queue`]: in-process hand-off from the API to a dispatcher loop
//! - [`poller`]: database polling loop used by the standalone worker binary
//! - [`runner`]: counts, parses and upserts one import file
//!
//! Both entry points claim a job before running it, so the two can run
//! side by side without importing a file twice.

pub mod config;
pub mod error;
pub mod poller;
pub mod queue;
pub mod runner;

pub use config::ImportConfig;
pub use error::ImportError;
pub use queue::ImportQueue;
