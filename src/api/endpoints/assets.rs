//! Collector batch ingest.
//!
//! `POST /api/assets/bulk` and its alias `POST /api/assets/save`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{BulkIn, BulkResult};
use crate::pipeline::ingest;

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub result: BulkResult,
}

/// Reconcile, profile and guard every item in one transaction.
pub async fn bulk(
    State(ctx): State<ApiContext>,
    payload: Result<Json<BulkIn>, JsonRejection>,
) -> Result<Json<BulkResponse>, ApiError> {
    let Json(batch) = payload?;
    let core = ctx.core.clone();

    // SQLite work blocks (busy_timeout waits on other writers)
    let result = tokio::task::spawn_blocking(move || -> Result<BulkResult, ApiError> {
        let conn = core.open_db()?;
        Ok(ingest::ingest_batch(&conn, &batch)?)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Ingest task failed: {e}")))??;

    Ok(Json(BulkResponse { ok: true, result }))
}
