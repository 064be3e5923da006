/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Vehicle identifiers are fleet numbers assigned by the operator (e.g. `"MTT-07"`).
pub type VehicleId = String;
