//! Storage error types for rota-db.
//!
//! The first four variants are the domain taxonomy: expected outcomes
//! detected before commit. Everything below them is infrastructure failure
//! and always comes with a full transaction rollback.

use rota_core::enums::EntityKind;
use rota_core::errors::CoreError;
use thiserror::Error;

use crate::repos::conflict::ConflictingEvent;

/// Errors from storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referenced event/template/record does not exist (or is inactive).
    #[error("{kind} record not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// The requested interval overlaps existing events for the team.
    /// Carries the conflicting events so the caller can resolve manually.
    #[error("interval overlaps {} existing event(s)", .0.len())]
    Conflict(Vec<ConflictingEvent>),

    /// Week duplication was requested from a week with no events.
    #[error("source week contains no events")]
    EmptySource,

    /// The actor lacks the capability the operation requires.
    #[error("{0}")]
    Forbidden(String),

    /// Input violated an entity invariant.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A SQL query failed or returned unparseable data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::Forbidden { .. } => Self::Forbidden(err.to_string()),
            CoreError::Other(inner) => Self::Other(inner),
        }
    }
}
