//! Cross-cutting error types for Rota.
//!
//! Domain-specific errors (e.g., `StoreError`, `ConfigError`) are defined in
//! their respective crates; the CLI converges everything through `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any Rota crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Data failed an entity invariant (title length, interval direction, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The actor lacks the capability the operation requires.
    #[error("Forbidden: {actor} lacks capability {capability}")]
    Forbidden { actor: String, capability: String },

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
