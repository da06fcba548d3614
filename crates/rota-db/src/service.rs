//! Service layer orchestrating storage mutations with audit.
//!
//! `RotaService` wraps `RotaDb` and carries the request-origin metadata
//! attached to audit entries. All repo methods are implemented as
//! `impl RotaService` blocks in [`crate::repos`].
//!
//! Every mutation method follows this protocol:
//! 1. Capability check (once, at entry)
//! 2. Begin transaction
//! 3. Conflict check where the call site wants overlap prevention
//! 4. Execute SQL
//! 5. Append audit entry (inside the same transaction)
//! 6. Commit — any failure before this rolls everything back

use serde::{Deserialize, Serialize};

use crate::RotaDb;
use crate::error::StoreError;

/// Request-origin metadata recorded with every audit entry.
///
/// Supplied by the transport boundary (e.g., the HTTP layer); `None` fields
/// are stored as NULL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestOrigin {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Orchestrates the event store, conflict detector, audit recorder,
/// planning templates, and the batch derivation engine.
pub struct RotaService {
    db: RotaDb,
    origin: RequestOrigin,
}

impl RotaService {
    /// Create a new service over a local database.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, StoreError> {
        let db = RotaDb::open_local(db_path).await?;
        Ok(Self {
            db,
            origin: RequestOrigin::default(),
        })
    }

    /// Create from an existing `RotaDb` (for testing).
    #[must_use]
    pub fn from_db(db: RotaDb) -> Self {
        Self {
            db,
            origin: RequestOrigin::default(),
        }
    }

    /// Attach request-origin metadata to all subsequent audit entries.
    #[must_use]
    pub fn with_origin(mut self, origin: RequestOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &RotaDb {
        &self.db
    }

    /// The request-origin metadata attached to audit entries.
    #[must_use]
    pub const fn origin(&self) -> &RequestOrigin {
        &self.origin
    }
}
