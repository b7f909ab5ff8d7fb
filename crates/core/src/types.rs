/// Job identifiers are opaque strings (UUID v4 at creation time).
pub type JobId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
