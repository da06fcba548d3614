//! CSV export of the audit trail.
//!
//! Snapshots are embedded verbatim as JSON strings inside quoted CSV fields,
//! so a row is self-contained even without access to the database. Actor
//! uids are resolved to email/name through a caller-supplied directory; an
//! unknown uid leaves those cells empty rather than failing the export.

use std::collections::HashMap;

use rota_core::identity::{ActorIdentity, Capability};

use crate::error::StoreError;
use crate::repos::audit::{query_filtered, AuditFilter};
use crate::service::RotaService;

/// Directory entry for resolving an audit row's `user_uid` to display fields.
#[derive(Debug, Clone)]
pub struct ActorProfile {
    pub email: String,
    pub name: String,
}

const HEADER: &str = "timestamp,action,kind,record_id,actor_email,actor_name,origin_address,old_values,new_values";

/// Quote a CSV field per RFC 4180: wrap in double quotes when the value
/// contains a comma, quote, or newline, doubling embedded quotes.
fn csv_field(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

impl RotaService {
    /// Render the filtered audit trail as a CSV document, newest first.
    /// Returns the full document including the header row.
    ///
    /// # Errors
    ///
    /// `Forbidden` for actors without audit access, or a query error.
    pub async fn export_audit(
        &self,
        actor: &ActorIdentity,
        filter: &AuditFilter,
        actors: &HashMap<String, ActorProfile>,
    ) -> Result<String, StoreError> {
        actor.require(Capability::ViewAudit)?;

        let entries = query_filtered(
            self.db().conn(),
            filter,
            "datetime(created_at) DESC, id DESC",
        )
        .await?;

        let mut out = String::from(HEADER);
        out.push('\n');
        for entry in &entries {
            let profile = actors.get(&entry.user_uid);
            let fields = [
                entry.created_at.to_rfc3339(),
                entry.action.as_str().to_string(),
                entry.table_name.as_str().to_string(),
                entry.record_id.clone(),
                profile.map(|p| p.email.clone()).unwrap_or_default(),
                profile.map(|p| p.name.clone()).unwrap_or_default(),
                entry.ip_address.clone().unwrap_or_default(),
                entry
                    .old_values
                    .as_ref()
                    .map(serde_json::Value::to_string)
                    .unwrap_or_default(),
                entry
                    .new_values
                    .as_ref()
                    .map(serde_json::Value::to_string)
                    .unwrap_or_default(),
            ];
            let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
            out.push_str(&row.join(","));
            out.push('\n');
        }

        tracing::debug!(rows = entries.len(), "audit trail exported");
        Ok(out)
    }
}
