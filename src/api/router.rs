//! Analyzer HTTP router.
//!
//! Layers (outermost → innermost):
//! 1. Audit logger → 2. `Cache-Control: no-store` → 3. Body limit → Handler

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the analyzer router over shared state.
///
/// NOTE: Path params use `:param` / `*wildcard` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(core: Arc<CoreState>) -> Router {
    let max_body_bytes = core.config.max_body_bytes;
    let ctx = ApiContext::new(core);

    Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/api/assets/bulk", post(endpoints::assets::bulk))
        .route("/api/assets/save", post(endpoints::assets::bulk))
        .route("/collect/meta", post(endpoints::collect::meta))
        .route("/profiles", get(endpoints::profiles::by_query))
        .route("/profiles/*locator", get(endpoints::profiles::by_path))
        .route("/guards/violations", get(endpoints::guards::violations))
        .route("/guards/status", get(endpoints::guards::status))
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
}
