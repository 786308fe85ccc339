//! Repository layer — table-scoped database operations.
//!
//! Every function takes a borrowed `Connection`; callers that need atomicity
//! pass a `Transaction` (which derefs to `Connection`).

mod data_object;
mod guard;
mod object_profile;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use super::DatabaseError;

pub use data_object::*;
pub use guard::*;
pub use object_profile::*;

/// Timestamps are stored as fixed-width RFC 3339 UTC text so that
/// lexical order in SQL matches chronological order.
pub(crate) fn ts_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn ts_from_sql(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad timestamp {raw:?}: {e}")))
}

pub(crate) fn uuid_from_sql(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
