//! # rota-db
//!
//! libSQL storage for Rota: the event store, the interval-conflict detector,
//! the append-only audit trail, planning templates, and the batch derivation
//! engine (week duplication + template application).
//!
//! Every mutation runs inside one transaction: conflict check, row write,
//! audit append, commit — if any step fails, nothing is committed.
//!
//! Uses the `libsql` crate (C `SQLite` fork) — stable API, native
//! transactions, single-database-instance serialization.

pub mod error;
pub mod export;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
pub(crate) mod test_support;

use error::StoreError;
use libsql::Builder;

/// Central database handle for all Rota storage operations.
///
/// Wraps a libSQL database and connection. Repository methods live on
/// [`service::RotaService`]; this type owns opening, migrations, and ID
/// generation.
pub struct RotaDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl RotaDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened or migrations
    /// fail.
    pub async fn open_local(path: &str) -> Result<Self, StoreError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| StoreError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let rota_db = Self { db, conn };
        rota_db.run_migrations().await?;
        Ok(rota_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID. Returns e.g., `"evt-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, StoreError> {
        generate_id(&self.conn, prefix).await
    }
}

/// Generate a prefixed ID on the given scope (plain connection or open
/// transaction). Uses `randomblob(4)` in SQL to produce 8-char hex.
///
/// # Errors
///
/// Returns `StoreError` if the query fails or returns no rows.
pub async fn generate_id(
    scope: &libsql::Connection,
    prefix: &str,
) -> Result<String, StoreError> {
    let mut rows = scope
        .query(
            &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
            (),
        )
        .await?;
    let row = rows.next().await?.ok_or(StoreError::NoResult)?;
    Ok(row.get::<String>(0)?)
}
