//! Read-side queries over the catalog: profiles by locator, guard
//! violations and aggregate guard status.

use rusqlite::Connection;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{GuardStatus, GuardViolation, ProfileView};

pub const DEFAULT_VIOLATIONS_LIMIT: u32 = 50;
pub const MAX_VIOLATIONS_LIMIT: u32 = 200;

/// Stored profile for `locator`. `NotFound` when the locator is unknown or
/// has never been profiled.
pub fn get_profile(conn: &Connection, locator: &str) -> Result<ProfileView, DatabaseError> {
    repository::get_profile_by_locator(conn, locator)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "object_profile".into(),
        id: locator.to_string(),
    })
}

/// Most recent violations. `limit` defaults to 50 and is clamped to 200.
pub fn list_violations(
    conn: &Connection,
    limit: Option<u32>,
) -> Result<Vec<GuardViolation>, DatabaseError> {
    let limit = limit
        .unwrap_or(DEFAULT_VIOLATIONS_LIMIT)
        .min(MAX_VIOLATIONS_LIMIT);
    repository::list_guard_violations(conn, limit)
}

/// `separated_ok + separated_missing == pseudonymized_total` always holds.
pub fn get_status(conn: &Connection) -> Result<GuardStatus, DatabaseError> {
    let pseudonymized_total = repository::count_pseudonymized(conn)?;
    let separated_ok = repository::count_separated(conn)?;
    Ok(GuardStatus {
        pseudonymized_total,
        separated_ok,
        separated_missing: pseudonymized_total - separated_ok,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::{AssetIn, BulkIn};
    use crate::pipeline::ingest::ingest_batch_at;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::{json, Value};

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, minute, 0).unwrap()
    }

    fn ingest(conn: &Connection, locator: &str, meta: Value, minute: u32) {
        let batch = BulkIn {
            source_id: "collector".into(),
            items: vec![AssetIn {
                kind: "object".into(),
                locator: locator.into(),
                name: "n".into(),
                region: "r".into(),
                bytes: Some(42),
                meta: Some(meta),
            }],
        };
        ingest_batch_at(conn, &batch, at(minute)).unwrap();
    }

    fn pseudonymized(separated: bool) -> Value {
        let separated_by = if separated {
            json!({"different_account": true})
        } else {
            json!({})
        };
        json!({"mapping_locator": "s3://map/m", "separated_by": separated_by})
    }

    #[test]
    fn profile_lookup_by_locator() {
        let conn = open_memory_database().unwrap();
        ingest(&conn, "s3://b/data.csv", json!({"sample": "id,v\n1,2"}), 0);

        let view = get_profile(&conn, "s3://b/data.csv").unwrap();
        assert_eq!(view.locator, "s3://b/data.csv");
        assert_eq!(view.bytes, 42);
        assert_eq!(view.line_count, 2);
        assert!(view.has_csv_header);
    }

    #[test]
    fn profile_not_found_for_unknown_or_unprofiled() {
        let conn = open_memory_database().unwrap();
        ingest(&conn, "s3://b/empty", json!({}), 0);

        for locator in ["s3://nowhere", "s3://b/empty"] {
            match get_profile(&conn, locator) {
                Err(DatabaseError::NotFound { entity_type, id }) => {
                    assert_eq!(entity_type, "object_profile");
                    assert_eq!(id, locator);
                }
                other => panic!("expected NotFound, got {other:?}"),
            }
        }
    }

    #[test]
    fn violations_default_and_clamp_limit() {
        let conn = open_memory_database().unwrap();
        for i in 0..3 {
            ingest(&conn, &format!("s3://v{i}"), pseudonymized(false), i);
        }
        ingest(&conn, "s3://ok", pseudonymized(true), 9);

        let all = list_violations(&conn, None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].locator, "s3://v2");
        assert!(all.iter().all(|v| v.separated == Some(false)));

        assert_eq!(list_violations(&conn, Some(1)).unwrap().len(), 1);
        assert_eq!(list_violations(&conn, Some(10_000)).unwrap().len(), 3);
    }

    #[test]
    fn status_counts_are_consistent() {
        let conn = open_memory_database().unwrap();
        assert_eq!(
            get_status(&conn).unwrap(),
            GuardStatus { pseudonymized_total: 0, separated_ok: 0, separated_missing: 0 }
        );

        ingest(&conn, "s3://a", pseudonymized(true), 0);
        ingest(&conn, "s3://b", pseudonymized(false), 1);
        ingest(&conn, "s3://c", pseudonymized(false), 2);
        ingest(&conn, "s3://plain", json!({}), 3);

        let status = get_status(&conn).unwrap();
        assert_eq!(status.pseudonymized_total, 3);
        assert_eq!(status.separated_ok, 1);
        assert_eq!(status.separated_missing, 2);
    }

    #[test]
    fn fixing_separation_clears_violation() {
        let conn = open_memory_database().unwrap();
        ingest(&conn, "s3://a", pseudonymized(false), 0);
        assert_eq!(list_violations(&conn, None).unwrap().len(), 1);

        ingest(&conn, "s3://a", pseudonymized(true), 1);
        assert!(list_violations(&conn, None).unwrap().is_empty());
        assert_eq!(get_status(&conn).unwrap().separated_ok, 1);
    }
}
