/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Import jobs are addressed by an opaque UUID handed to the polling client.
pub type JobId = uuid::Uuid;
