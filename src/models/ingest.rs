use serde::{Deserialize, Serialize};

/// One asset as reported by a collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetIn {
    pub kind: String,
    pub locator: String,
    pub name: String,
    pub region: String,
    #[serde(default)]
    pub bytes: Option<i64>,
    /// Must be a JSON object when present.
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

/// A collector batch. Ingested atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkIn {
    pub source_id: String,
    pub items: Vec<AssetIn>,
}

/// Per-batch counters returned by ingest.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkResult {
    pub created: u32,
    pub updated: u32,
    pub profiled: u32,
    pub guarded: u32,
}

/// Direct registration of a single object, bypassing profiling and guards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaIn {
    pub source_id: String,
    pub object_type: String,
    pub locator: String,
    #[serde(default)]
    pub parent_locator: Option<String>,
    #[serde(default)]
    pub bytes: Option<i64>,
    #[serde(default)]
    pub extra: Option<serde_json::Value>,
}
