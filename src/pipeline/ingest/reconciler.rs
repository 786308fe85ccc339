use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde_json::Value;
use uuid::Uuid;

use super::attributes::{merge_attributes, Fingerprint};
use super::profiler::{profile_text, sample_text};
use super::separation::evaluate_guard;
use super::IngestError;
use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{
    AssetIn, Attributes, BulkIn, BulkResult, DataObject, MetaIn, ObjectObservation,
};

/// Ingest a collector batch at the current time.
pub fn ingest_batch(conn: &Connection, batch: &BulkIn) -> Result<BulkResult, IngestError> {
    ingest_batch_at(conn, batch, Utc::now())
}

/// Ingest a collector batch, stamping every write with `now`.
///
/// The batch is validated up front, then every item is reconciled, profiled
/// and guarded inside one `IMMEDIATE` transaction. Items apply in order, so a
/// locator repeated within the batch ends with its last item's values. Any
/// failure rolls back the whole batch.
pub fn ingest_batch_at(
    conn: &Connection,
    batch: &BulkIn,
    now: DateTime<Utc>,
) -> Result<BulkResult, IngestError> {
    let metas = validate_batch(batch)?;

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    match apply_items(&tx, batch, metas, &now) {
        Ok(result) => {
            tx.commit()?;
            tracing::info!(
                source_id = %batch.source_id,
                items = batch.items.len(),
                created = result.created,
                updated = result.updated,
                profiled = result.profiled,
                guarded = result.guarded,
                "Batch ingested"
            );
            Ok(result)
        }
        Err(e) => {
            // Dropping `tx` rolls back
            tracing::warn!(source_id = %batch.source_id, error = %e, "Batch rolled back");
            Err(e)
        }
    }
}

fn apply_items(
    conn: &Connection,
    batch: &BulkIn,
    metas: Vec<Option<Attributes>>,
    now: &DateTime<Utc>,
) -> Result<BulkResult, IngestError> {
    let mut result = BulkResult::default();
    for (item, meta) in batch.items.iter().zip(metas) {
        ingest_item(conn, &batch.source_id, item, meta, now, &mut result)?;
    }
    Ok(result)
}

fn ingest_item(
    conn: &Connection,
    source_id: &str,
    item: &AssetIn,
    meta: Option<Attributes>,
    now: &DateTime<Utc>,
    result: &mut BulkResult,
) -> Result<(), IngestError> {
    let attrs = merge_attributes(meta.as_ref(), &item.name, &item.region);
    let fingerprint = Fingerprint::from_attributes(&attrs);
    let profile = sample_text(&attrs).map(profile_text);
    let guard = evaluate_guard(&attrs);

    let observation = ObjectObservation {
        source_id: source_id.to_string(),
        object_type: item.kind.clone(),
        locator: item.locator.clone(),
        parent_locator: None,
        bytes: item.bytes,
        extra: attrs,
        last_modified: fingerprint.last_modified,
        etag: fingerprint.etag,
        checksum: fingerprint.checksum,
        version: fingerprint.version,
    };

    let outcome = repository::upsert_data_object(conn, &Uuid::new_v4(), &observation, now)?;
    let object_id = outcome.object_id();
    if outcome.is_created() {
        result.created += 1;
    } else {
        result.updated += 1;
    }
    tracing::debug!(
        locator = %item.locator,
        object_id = %object_id,
        created = outcome.is_created(),
        "Reconciled asset"
    );

    if let Some(profile) = profile {
        let stored = profile.into_object_profile(object_id, item.bytes, *now);
        repository::upsert_object_profile(conn, &stored)?;
        result.profiled += 1;
    }

    if let Some(evaluation) = guard {
        let stored = evaluation.into_guard(object_id, *now);
        repository::upsert_guard(conn, &stored)?;
        result.guarded += 1;
    }

    Ok(())
}

/// Reject malformed input before anything is written. Returns each item's
/// `meta` as an attribute map. `name` and `region` are only merge defaults,
/// so any string is accepted there (S3 reports us-east-1 as an empty region).
fn validate_batch(batch: &BulkIn) -> Result<Vec<Option<Attributes>>, IngestError> {
    require_non_blank("source_id", &batch.source_id)?;

    batch
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let field = |name: &str| format!("items[{index}].{name}");
            require_non_blank(&field("kind"), &item.kind)?;
            require_non_blank(&field("locator"), &item.locator)?;
            attributes_from(&field("meta"), item.meta.as_ref())
        })
        .collect()
}

fn require_non_blank(field: &str, value: &str) -> Result<(), IngestError> {
    if value.trim().is_empty() {
        return Err(IngestError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

/// `null` and absence both mean "no attributes"; anything but an object is invalid.
fn attributes_from(field: &str, value: Option<&Value>) -> Result<Option<Attributes>, IngestError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map.clone())),
        Some(_) => Err(IngestError::Validation(format!("{field} must be a JSON object"))),
    }
}

/// Register a single object directly, with an optional parent locator.
///
/// Unlike batch ingest this never updates: a locator that already exists is
/// rejected with `DuplicateLocator`. No profile or guard is derived.
pub fn register_object(conn: &Connection, meta: &MetaIn) -> Result<Uuid, IngestError> {
    require_non_blank("source_id", &meta.source_id)?;
    require_non_blank("object_type", &meta.object_type)?;
    require_non_blank("locator", &meta.locator)?;
    let extra = attributes_from("extra", meta.extra.as_ref())?.unwrap_or_default();

    let now = Utc::now();
    let obj = DataObject {
        id: Uuid::new_v4(),
        source_id: meta.source_id.clone(),
        object_type: meta.object_type.clone(),
        locator: meta.locator.clone(),
        parent_locator: meta.parent_locator.clone().filter(|p| !p.trim().is_empty()),
        bytes: meta.bytes,
        extra,
        first_seen: now,
        last_scanned: now,
        last_modified: None,
        etag: None,
        checksum: None,
        version: None,
    };

    match repository::insert_data_object(conn, &obj) {
        Ok(()) => {
            tracing::info!(locator = %obj.locator, object_id = %obj.id, "Object registered");
            Ok(obj.id)
        }
        Err(DatabaseError::ConstraintViolation(_)) => {
            Err(IngestError::DuplicateLocator(obj.locator))
        }
        Err(e) => Err(e.into()),
    }
}
