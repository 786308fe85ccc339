//! HTTP transport.
//!
//! Collectors post asset batches under `/api/assets/`; direct object
//! registration lives at `/collect/meta`; profiles and guard reports are
//! read back under `/profiles` and `/guards`.
//!
//! `api_router()` returns a `Router` that can be mounted on any axum
//! server; `server::serve` runs it standalone.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::serve;
pub use types::ApiContext;
