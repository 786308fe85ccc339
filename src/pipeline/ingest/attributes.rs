//! Attribute merging and the provider fingerprint fields read from it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::models::Attributes;

/// Offset-bearing layouts tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
];

/// Layouts without an offset; interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Caller-supplied `meta` with `display_name` and `region` filled in only
/// where the caller left them out. Shallow: nested objects are not merged.
pub fn merge_attributes(meta: Option<&Attributes>, name: &str, region: &str) -> Attributes {
    let mut merged = meta.cloned().unwrap_or_default();
    merged
        .entry("display_name")
        .or_insert_with(|| Value::String(name.to_string()));
    merged
        .entry("region")
        .or_insert_with(|| Value::String(region.to_string()));
    merged
}

/// Permissive ISO-8601 parse. A trailing `Z` means UTC, values without an
/// offset are taken as UTC, a bare date is midnight. Anything else is `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let normalized = match s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        Some(rest) => format!("{rest}+00:00"),
        None => s.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Content fingerprint reported by the provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fingerprint {
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
    pub checksum: Option<String>,
    pub version: Option<String>,
}

impl Fingerprint {
    pub fn from_attributes(attrs: &Attributes) -> Self {
        let last_modified = match attrs.get("last_modified") {
            Some(Value::String(raw)) => {
                let parsed = parse_timestamp(raw);
                if parsed.is_none() {
                    tracing::debug!(value = %raw, "Unparseable last_modified, treating as absent");
                }
                parsed
            }
            _ => None,
        };

        Self {
            last_modified,
            etag: text_attribute(attrs, "etag"),
            checksum: text_attribute(attrs, "checksum"),
            version: text_attribute(attrs, "version"),
        }
    }
}

/// Strings as-is, numbers as their decimal text, anything else absent.
fn text_attribute(attrs: &Attributes, key: &str) -> Option<String> {
    match attrs.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
