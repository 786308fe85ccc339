use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{ts_from_sql, ts_to_sql, uuid_from_sql};
use crate::db::DatabaseError;
use crate::models::{ObjectProfile, ProfileView};

/// Replace the stored profile for `profile.object_id` (insert when absent).
pub fn upsert_object_profile(conn: &Connection, profile: &ObjectProfile) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO object_profile
           (object_id, bytes, line_count, avg_line_len, max_line_len,
            ratio_digit, ratio_alpha, ratio_symbol, has_csv_header, profiled_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(object_id) DO UPDATE SET
           bytes = excluded.bytes,
           line_count = excluded.line_count,
           avg_line_len = excluded.avg_line_len,
           max_line_len = excluded.max_line_len,
           ratio_digit = excluded.ratio_digit,
           ratio_alpha = excluded.ratio_alpha,
           ratio_symbol = excluded.ratio_symbol,
           has_csv_header = excluded.has_csv_header,
           profiled_at = excluded.profiled_at",
        params![
            profile.object_id.to_string(),
            profile.bytes,
            profile.line_count,
            profile.avg_line_len,
            profile.max_line_len,
            profile.ratio_digit,
            profile.ratio_alpha,
            profile.ratio_symbol,
            profile.has_csv_header,
            ts_to_sql(&profile.profiled_at),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

pub fn get_object_profile(
    conn: &Connection,
    object_id: &Uuid,
) -> Result<Option<ObjectProfile>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT o.locator, p.object_id, p.bytes, p.line_count, p.avg_line_len, p.max_line_len,
                    p.ratio_digit, p.ratio_alpha, p.ratio_symbol, p.has_csv_header, p.profiled_at
             FROM object_profile p
             JOIN data_object o ON o.id = p.object_id
             WHERE p.object_id = ?1",
            params![object_id.to_string()],
            profile_row,
        )
        .optional()?;

    row.map(|r| profile_view_from_row(r).map(ObjectProfile::from))
        .transpose()
}

/// Profile of the object at `locator`, joined with the locator itself.
/// `Ok(None)` when the locator is unknown or was never profiled.
pub fn get_profile_by_locator(
    conn: &Connection,
    locator: &str,
) -> Result<Option<ProfileView>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT o.locator, p.object_id, p.bytes, p.line_count, p.avg_line_len, p.max_line_len,
                    p.ratio_digit, p.ratio_alpha, p.ratio_symbol, p.has_csv_header, p.profiled_at
             FROM object_profile p
             JOIN data_object o ON o.id = p.object_id
             WHERE o.locator = ?1",
            params![locator],
            profile_row,
        )
        .optional()?;

    row.map(profile_view_from_row).transpose()
}

pub fn count_object_profiles(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM object_profile", [], |row| row.get(0))?;
    Ok(count)
}

impl From<ProfileView> for ObjectProfile {
    fn from(view: ProfileView) -> Self {
        ObjectProfile {
            object_id: view.object_id,
            bytes: view.bytes,
            line_count: view.line_count,
            avg_line_len: view.avg_line_len,
            max_line_len: view.max_line_len,
            ratio_digit: view.ratio_digit,
            ratio_alpha: view.ratio_alpha,
            ratio_symbol: view.ratio_symbol,
            has_csv_header: view.has_csv_header,
            profiled_at: view.profiled_at,
        }
    }
}

struct ProfileRow {
    locator: String,
    object_id: String,
    bytes: i64,
    line_count: i64,
    avg_line_len: f64,
    max_line_len: i64,
    ratio_digit: f64,
    ratio_alpha: f64,
    ratio_symbol: f64,
    has_csv_header: bool,
    profiled_at: String,
}

fn profile_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProfileRow> {
    Ok(ProfileRow {
        locator: row.get(0)?,
        object_id: row.get(1)?,
        bytes: row.get(2)?,
        line_count: row.get(3)?,
        avg_line_len: row.get(4)?,
        max_line_len: row.get(5)?,
        ratio_digit: row.get(6)?,
        ratio_alpha: row.get(7)?,
        ratio_symbol: row.get(8)?,
        has_csv_header: row.get(9)?,
        profiled_at: row.get(10)?,
    })
}

fn profile_view_from_row(row: ProfileRow) -> Result<ProfileView, DatabaseError> {
    Ok(ProfileView {
        locator: row.locator,
        object_id: uuid_from_sql(&row.object_id)?,
        bytes: row.bytes,
        line_count: row.line_count,
        avg_line_len: row.avg_line_len,
        max_line_len: row.max_line_len,
        ratio_digit: row.ratio_digit,
        ratio_alpha: row.ratio_alpha,
        ratio_symbol: row.ratio_symbol,
        has_csv_header: row.has_csv_header,
        profiled_at: ts_from_sql(&row.profiled_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::upsert_data_object;
    use crate::db::sqlite::open_memory_database;
    use crate::models::{Attributes, ObjectObservation};
    use chrono::{TimeZone, Utc};

    fn seed_object(conn: &Connection, locator: &str) -> Uuid {
        let obs = ObjectObservation {
            source_id: "c1".into(),
            object_type: "object".into(),
            locator: locator.into(),
            parent_locator: None,
            bytes: Some(10),
            extra: Attributes::new(),
            last_modified: None,
            etag: None,
            checksum: None,
            version: None,
        };
        upsert_data_object(conn, &Uuid::new_v4(), &obs, &Utc::now())
            .unwrap()
            .object_id()
    }

    fn profile(object_id: Uuid, line_count: i64, hour: u32) -> ObjectProfile {
        ObjectProfile {
            object_id,
            bytes: 10,
            line_count,
            avg_line_len: 3.0,
            max_line_len: 3,
            ratio_digit: 0.5,
            ratio_alpha: 0.25,
            ratio_symbol: 0.25,
            has_csv_header: true,
            profiled_at: Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn upsert_replaces_previous_profile() {
        let conn = open_memory_database().unwrap();
        let id = seed_object(&conn, "s3://b/k");
        upsert_object_profile(&conn, &profile(id, 2, 1)).unwrap();
        upsert_object_profile(&conn, &profile(id, 7, 2)).unwrap();

        assert_eq!(count_object_profiles(&conn).unwrap(), 1);
        let stored = get_object_profile(&conn, &id).unwrap().unwrap();
        assert_eq!(stored, profile(id, 7, 2));
    }

    #[test]
    fn lookup_by_locator_joins_object() {
        let conn = open_memory_database().unwrap();
        let id = seed_object(&conn, "s3://b/k");
        upsert_object_profile(&conn, &profile(id, 2, 1)).unwrap();

        let view = get_profile_by_locator(&conn, "s3://b/k").unwrap().unwrap();
        assert_eq!(view.locator, "s3://b/k");
        assert_eq!(view.object_id, id);
        assert_eq!(view.line_count, 2);
        assert!(view.has_csv_header);
    }

    #[test]
    fn unprofiled_object_has_no_profile() {
        let conn = open_memory_database().unwrap();
        seed_object(&conn, "s3://b/empty");
        assert!(get_profile_by_locator(&conn, "s3://b/empty").unwrap().is_none());
        assert!(get_profile_by_locator(&conn, "s3://unknown").unwrap().is_none());
    }

    #[test]
    fn profile_for_unknown_object_violates_foreign_key() {
        let conn = open_memory_database().unwrap();
        let err = upsert_object_profile(&conn, &profile(Uuid::new_v4(), 1, 1)).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }
}
