use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Open attribute map carried with every asset. Insertion-ordered; values are
/// JSON scalars, arrays or nested objects.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// One row per distinct asset locator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataObject {
    pub id: Uuid,
    pub source_id: String,
    pub object_type: String,
    pub locator: String,
    pub parent_locator: Option<String>,
    pub bytes: Option<i64>,
    pub extra: Attributes,
    pub first_seen: DateTime<Utc>,
    pub last_scanned: DateTime<Utc>,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
    pub checksum: Option<String>,
    pub version: Option<String>,
}

/// Everything a single observation of a locator writes.
///
/// On first sight it becomes a new [`DataObject`]; on later sightings it
/// overwrites the mutable columns and leaves `id`, `first_seen` and
/// `parent_locator` alone.
#[derive(Debug, Clone)]
pub struct ObjectObservation {
    pub source_id: String,
    pub object_type: String,
    pub locator: String,
    pub parent_locator: Option<String>,
    pub bytes: Option<i64>,
    pub extra: Attributes,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
    pub checksum: Option<String>,
    pub version: Option<String>,
}

/// Whether an upsert inserted a new row or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(Uuid),
    Updated(Uuid),
}

impl UpsertOutcome {
    pub fn object_id(&self) -> Uuid {
        match self {
            UpsertOutcome::Created(id) | UpsertOutcome::Updated(id) => *id,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }
}
