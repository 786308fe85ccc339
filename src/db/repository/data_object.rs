use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{ts_from_sql, ts_to_sql, uuid_from_sql};
use crate::db::DatabaseError;
use crate::models::{Attributes, DataObject, ObjectObservation, UpsertOutcome};

/// Insert or update the object identified by `obs.locator`.
///
/// `new_id` is used only when the locator has never been seen. The returned
/// id tells the two cases apart: it equals `new_id` only for a fresh insert.
/// On conflict, `id`, `first_seen` and `parent_locator` keep their stored values.
pub fn upsert_data_object(
    conn: &Connection,
    new_id: &Uuid,
    obs: &ObjectObservation,
    now: &DateTime<Utc>,
) -> Result<UpsertOutcome, DatabaseError> {
    let extra_json = serde_json::to_string(&obs.extra)?;
    let new_id_str = new_id.to_string();

    let stored_id: String = conn
        .query_row(
            "INSERT INTO data_object
               (id, source_id, object_type, locator, parent_locator, bytes, extra,
                first_seen, last_scanned, last_modified, etag, checksum, version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(locator) DO UPDATE SET
               source_id = excluded.source_id,
               object_type = excluded.object_type,
               bytes = excluded.bytes,
               extra = excluded.extra,
               last_scanned = excluded.last_scanned,
               last_modified = excluded.last_modified,
               etag = excluded.etag,
               checksum = excluded.checksum,
               version = excluded.version
             RETURNING id",
            params![
                new_id_str,
                obs.source_id,
                obs.object_type,
                obs.locator,
                obs.parent_locator,
                obs.bytes,
                extra_json,
                ts_to_sql(now),
                obs.last_modified.as_ref().map(ts_to_sql),
                obs.etag,
                obs.checksum,
                obs.version,
            ],
            |row| row.get(0),
        )
        .map_err(DatabaseError::from_write)?;

    if stored_id == new_id_str {
        Ok(UpsertOutcome::Created(*new_id))
    } else {
        Ok(UpsertOutcome::Updated(uuid_from_sql(&stored_id)?))
    }
}

/// Insert a brand-new object. A duplicate locator is a `ConstraintViolation`.
pub fn insert_data_object(conn: &Connection, obj: &DataObject) -> Result<(), DatabaseError> {
    let extra_json = serde_json::to_string(&obj.extra)?;
    conn.execute(
        "INSERT INTO data_object
           (id, source_id, object_type, locator, parent_locator, bytes, extra,
            first_seen, last_scanned, last_modified, etag, checksum, version)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            obj.id.to_string(),
            obj.source_id,
            obj.object_type,
            obj.locator,
            obj.parent_locator,
            obj.bytes,
            extra_json,
            ts_to_sql(&obj.first_seen),
            ts_to_sql(&obj.last_scanned),
            obj.last_modified.as_ref().map(ts_to_sql),
            obj.etag,
            obj.checksum,
            obj.version,
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

pub fn get_data_object_by_locator(
    conn: &Connection,
    locator: &str,
) -> Result<Option<DataObject>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, source_id, object_type, locator, parent_locator, bytes, extra,
                    first_seen, last_scanned, last_modified, etag, checksum, version
             FROM data_object WHERE locator = ?1",
            params![locator],
            |row| {
                Ok(DataObjectRow {
                    id: row.get(0)?,
                    source_id: row.get(1)?,
                    object_type: row.get(2)?,
                    locator: row.get(3)?,
                    parent_locator: row.get(4)?,
                    bytes: row.get(5)?,
                    extra: row.get(6)?,
                    first_seen: row.get(7)?,
                    last_scanned: row.get(8)?,
                    last_modified: row.get(9)?,
                    etag: row.get(10)?,
                    checksum: row.get(11)?,
                    version: row.get(12)?,
                })
            },
        )
        .optional()?;

    row.map(data_object_from_row).transpose()
}

pub fn count_data_objects(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM data_object", [], |row| row.get(0))?;
    Ok(count)
}

// Internal row type for DataObject mapping
struct DataObjectRow {
    id: String,
    source_id: String,
    object_type: String,
    locator: String,
    parent_locator: Option<String>,
    bytes: Option<i64>,
    extra: String,
    first_seen: String,
    last_scanned: String,
    last_modified: Option<String>,
    etag: Option<String>,
    checksum: Option<String>,
    version: Option<String>,
}

fn data_object_from_row(row: DataObjectRow) -> Result<DataObject, DatabaseError> {
    let extra: Attributes = serde_json::from_str(&row.extra)?;
    Ok(DataObject {
        id: uuid_from_sql(&row.id)?,
        source_id: row.source_id,
        object_type: row.object_type,
        locator: row.locator,
        parent_locator: row.parent_locator,
        bytes: row.bytes,
        extra,
        first_seen: ts_from_sql(&row.first_seen)?,
        last_scanned: ts_from_sql(&row.last_scanned)?,
        last_modified: row.last_modified.as_deref().map(ts_from_sql).transpose()?,
        etag: row.etag,
        checksum: row.checksum,
        version: row.version,
    })
}
