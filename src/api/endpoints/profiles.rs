//! Profile lookup by locator.
//!
//! Two forms:
//! - `GET /profiles?locator=s3://bucket/key`
//! - `GET /profiles/*locator` (locator as the remaining path)

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::ProfileView;
use crate::reporting;

#[derive(Deserialize)]
pub struct ProfileQuery {
    pub locator: String,
}

pub async fn by_query(
    State(ctx): State<ApiContext>,
    query: Result<Query<ProfileQuery>, QueryRejection>,
) -> Result<Json<ProfileView>, ApiError> {
    let Query(query) = query?;
    lookup(&ctx, &query.locator)
}

pub async fn by_path(
    State(ctx): State<ApiContext>,
    Path(locator): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    lookup(&ctx, &locator)
}

fn lookup(ctx: &ApiContext, locator: &str) -> Result<Json<ProfileView>, ApiError> {
    if locator.trim().is_empty() {
        return Err(ApiError::BadRequest("locator is required".into()));
    }
    let conn = ctx.core.open_db()?;
    Ok(Json(reporting::get_profile(&conn, locator)?))
}
