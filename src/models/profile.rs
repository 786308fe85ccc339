use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shape statistics of a sampled text, at most one per [`super::DataObject`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectProfile {
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
