//! Collector batch ingestion: reconcile assets by locator, profile sampled
//! content, evaluate the pseudonymization separation guard.
//!
//! The three stages run per item inside one batch transaction.

pub mod attributes;
pub mod profiler;
pub mod reconciler;
pub mod separation;

pub use attributes::*;
pub use profiler::*;
pub use reconciler::*;
pub use separation::*;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Invalid batch: {0}")]
    Validation(String),

    #[error("Locator already registered: {0}")]
    DuplicateLocator(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<rusqlite::Error> for IngestError {
    fn from(err: rusqlite::Error) -> Self {
        IngestError::Database(DatabaseError::Sqlite(err))
    }
}
