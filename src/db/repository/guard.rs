use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{ts_from_sql, ts_to_sql, uuid_from_sql};
use crate::db::DatabaseError;
use crate::models::{GuardViolation, PseudonymizationGuard};

/// Replace the stored guard for `guard.object_id` (insert when absent).
pub fn upsert_guard(conn: &Connection, guard: &PseudonymizationGuard) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO pseudonymization_guard
           (object_id, is_pseudonymized, mapping_locator, separated, separation_reason, checked_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(object_id) DO UPDATE SET
           is_pseudonymized = excluded.is_pseudonymized,
           mapping_locator = excluded.mapping_locator,
           separated = excluded.separated,
           separation_reason = excluded.separation_reason,
           checked_at = excluded.checked_at",
        params![
            guard.object_id.to_string(),
            guard.is_pseudonymized,
            guard.mapping_locator,
            guard.separated,
            guard.separation_reason,
            ts_to_sql(&guard.checked_at),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

pub fn get_guard(
    conn: &Connection,
    object_id: &Uuid,
) -> Result<Option<PseudonymizationGuard>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT object_id, is_pseudonymized, mapping_locator, separated, separation_reason, checked_at
             FROM pseudonymization_guard WHERE object_id = ?1",
            params![object_id.to_string()],
            |row| {
                Ok(GuardRow {
                    object_id: row.get(0)?,
                    is_pseudonymized: row.get(1)?,
                    mapping_locator: row.get(2)?,
                    separated: row.get(3)?,
                    separation_reason: row.get(4)?,
                    checked_at: row.get(5)?,
                })
            },
        )
        .optional()?;

    row.map(|r| {
        Ok(PseudonymizationGuard {
            object_id: uuid_from_sql(&r.object_id)?,
            is_pseudonymized: r.is_pseudonymized,
            mapping_locator: r.mapping_locator,
            separated: r.separated,
            separation_reason: r.separation_reason,
            checked_at: ts_from_sql(&r.checked_at)?,
        })
    })
    .transpose()
}

/// Pseudonymized guards whose `separated` is false or unset, newest check first.
/// Ties on `checked_at` are ordered by locator.
pub fn list_guard_violations(
    conn: &Connection,
    limit: u32,
) -> Result<Vec<GuardViolation>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT o.locator, g.mapping_locator, g.separated, g.separation_reason, g.checked_at
         FROM pseudonymization_guard g
         JOIN data_object o ON o.id = g.object_id
         WHERE g.is_pseudonymized = 1 AND COALESCE(g.separated, 0) = 0
         ORDER BY g.checked_at DESC, o.locator ASC
         LIMIT ?1",
    )?;

    let rows = stmt
        .query_map(params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<bool>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(locator, mapping_locator, separated, separation_reason, checked_at)| {
            Ok(GuardViolation {
                locator,
                mapping_locator,
                separated,
                separation_reason,
                checked_at: ts_from_sql(&checked_at)?,
            })
        })
        .collect()
}

/// Number of guards marking their object as pseudonymized.
pub fn count_pseudonymized(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM pseudonymization_guard WHERE is_pseudonymized = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Number of pseudonymized guards with `separated = true`.
pub fn count_separated(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM pseudonymization_guard
         WHERE is_pseudonymized = 1 AND COALESCE(separated, 0) = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

struct GuardRow {
    object_id: String,
    is_pseudonymized: bool,
    mapping_locator: Option<String>,
    separated: Option<bool>,
    separation_reason: Option<String>,
    checked_at: String,
}
