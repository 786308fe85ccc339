use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Separation check for a pseudonymized asset, at most one per [`super::DataObject`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PseudonymizationGuard {
    pub object_id: Uuid,
    pub is_pseudonymized: bool,
    /// Locator of the asset holding the re-identification mapping. Logical
    /// pointer only; the target need not be in the catalog.
    pub mapping_locator: Option<String>,
    /// `None` when separation could not be evaluated.
    pub separated: Option<bool>,
    pub separation_reason: Option<String>,
    pub checked_at: DateTime<Utc>,
}
