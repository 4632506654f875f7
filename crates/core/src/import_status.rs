//! Import job status labels and result constants.
//!
//! The labels are what polling clients see in the `status` field. They
//! mirror the seeded rows of the `import_job_statuses` lookup table.

pub const IMPORT_STATUS_PENDING: &str = "PENDING";
pub const IMPORT_STATUS_PROGRESS: &str = "PROGRESS";
pub const IMPORT_STATUS_SUCCESS: &str = "SUCCESS";
pub const IMPORT_STATUS_FAILURE: &str = "FAILURE";

/// Message stored in the `status` field of a successful import result.
pub const IMPORT_COMPLETED_MESSAGE: &str = "Task completed!";

/// Source of a job created by the single-request upload endpoint.
pub const JOB_SOURCE_UPLOAD: &str = "upload";

/// Source of a job created by finalizing a chunked upload.
pub const JOB_SOURCE_CHUNKED: &str = "chunked";

/// Maximum number of skipped row numbers reported in an import result.
pub const MAX_REPORTED_SKIPPED_ROWS: usize = 50;
