use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Profile joined with its object's locator.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileView {
    pub locator: String,
    pub object_id: Uuid,
    pub bytes: i64,
    pub line_count: i64,
    pub avg_line_len: f64,
    pub max_line_len: i64,
    pub ratio_digit: f64,
    pub ratio_alpha: f64,
    pub ratio_symbol: f64,
    pub has_csv_header: bool,
    pub profiled_at: DateTime<Utc>,
}

/// A pseudonymized asset whose separation evidence is missing or insufficient.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GuardViolation {
    pub locator: String,
    pub mapping_locator: Option<String>,
    pub separated: Option<bool>,
    pub separation_reason: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// Aggregate guard counts.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct GuardStatus {
    pub pseudonymized_total: i64,
    pub separated_ok: i64,
    pub separated_missing: i64,
}
