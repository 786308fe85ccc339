//! `POST /collect/meta` — register one object directly.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::MetaIn;
use crate::pipeline::ingest;

#[derive(Debug, Serialize)]
pub struct StoredResponse {
    pub object_id: String,
    pub message: &'static str,
}

/// Insert-only: an already registered locator is a 409.
pub async fn meta(
    State(ctx): State<ApiContext>,
    payload: Result<Json<MetaIn>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredResponse>), ApiError> {
    let Json(meta) = payload?;
    let core = ctx.core.clone();

    let object_id = tokio::task::spawn_blocking(move || -> Result<Uuid, ApiError> {
        let conn = core.open_db()?;
        Ok(ingest::register_object(&conn, &meta)?)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Register task failed: {e}")))??;

    Ok((
        StatusCode::CREATED,
        Json(StoredResponse {
            object_id: object_id.to_string(),
            message: "stored",
        }),
    ))
}
