//! Pseudonymization guard reports.
//!
//! - `GET /guards/violations?limit=N` — newest violations first
//! - `GET /guards/status` — aggregate counts

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{GuardStatus, GuardViolation};
use crate::reporting;

#[derive(Deserialize)]
pub struct ViolationsQuery {
    pub limit: Option<u32>,
}

pub async fn violations(
    State(ctx): State<ApiContext>,
    query: Result<Query<ViolationsQuery>, QueryRejection>,
) -> Result<Json<Vec<GuardViolation>>, ApiError> {
    let Query(query) = query?;
    let conn = ctx.core.open_db()?;
    Ok(Json(reporting::list_violations(&conn, query.limit)?))
}

pub async fn status(State(ctx): State<ApiContext>) -> Result<Json<GuardStatus>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(reporting::get_status(&conn)?))
}
