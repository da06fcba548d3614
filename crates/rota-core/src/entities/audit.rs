use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AuditAction, EntityKind};

/// An append-only audit log entry recording a single mutation.
///
/// Snapshots are full before/after states (never partial patches) so any
/// point of a record's history can be replayed without intermediate entries.
/// Entries are written in the same transaction as the mutation they document
/// and are only ever removed by the retention sweep.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditLogEntry {
    pub id: String,
    pub table_name: EntityKind,
    pub record_id: String,
    pub action: AuditAction,
    pub user_uid: String,
    /// Full prior state. `None` for create.
    pub old_values: Option<serde_json::Value>,
    /// Full post state. `None` for delete.
    pub new_values: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}
