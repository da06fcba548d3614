//! Audit recorder: append-only change log with read-time diffs.
//!
//! `record_audit` appends inside a caller-supplied transaction scope and
//! never opens its own transaction — the entry must be atomic with the
//! mutation it documents. Snapshots are full before/after states so any
//! point of a record's history can be replayed without intermediate entries.
//! Entries are never updated; the retention sweep is the only deletion path.

use chrono::{DateTime, Utc};

use rota_core::diff::{FieldChange, diff};
use rota_core::entities::AuditLogEntry;
use rota_core::enums::{AuditAction, EntityKind};
use rota_core::identity::{ActorIdentity, Capability};

use crate::error::StoreError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::service::RotaService;

/// Filter criteria for audit queries.
#[derive(Debug, Default, Clone)]
pub struct AuditFilter {
    pub kind: Option<EntityKind>,
    pub record_id: Option<String>,
    pub user_uid: Option<String>,
    pub action: Option<AuditAction>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

/// A page of audit entries plus the total match count for pagination.
#[derive(Debug, serde::Serialize)]
pub struct AuditPage {
    pub entries: Vec<AuditLogEntry>,
    pub total: u64,
}

/// One step of a record's history: the entry plus its field-level diff
/// (non-empty only for update entries). Diffs are derived at read time,
/// never stored.
#[derive(Debug, serde::Serialize)]
pub struct HistoryEntry {
    pub entry: AuditLogEntry,
    pub changes: Vec<FieldChange>,
}

/// Append one audit entry on the given scope (an open transaction in every
/// mutation path). Never opens its own transaction.
///
/// # Errors
///
/// Returns `StoreError` if the INSERT fails — callers must treat that as a
/// failure of the whole mutation, not drop the entry.
pub async fn record_audit(
    scope: &libsql::Connection,
    entry: &AuditLogEntry,
) -> Result<(), StoreError> {
    scope
        .execute(
            "INSERT INTO audit_logs (id, table_name, record_id, action, user_uid,
                                     old_values, new_values, ip_address, user_agent, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            libsql::params![
                entry.id.as_str(),
                entry.table_name.as_str(),
                entry.record_id.as_str(),
                entry.action.as_str(),
                entry.user_uid.as_str(),
                entry
                    .old_values
                    .as_ref()
                    .map(std::string::ToString::to_string)
                    .as_deref(),
                entry
                    .new_values
                    .as_ref()
                    .map(std::string::ToString::to_string)
                    .as_deref(),
                entry.ip_address.as_deref(),
                entry.user_agent.as_deref(),
                entry.created_at.to_rfc3339()
            ],
        )
        .await?;
    Ok(())
}

const SELECT_COLS: &str = "id, table_name, record_id, action, user_uid, \
                           old_values, new_values, ip_address, user_agent, created_at";

fn row_to_entry(row: &libsql::Row) -> Result<AuditLogEntry, StoreError> {
    Ok(AuditLogEntry {
        id: row.get::<String>(0)?,
        table_name: parse_enum(&row.get::<String>(1)?)?,
        record_id: row.get::<String>(2)?,
        action: parse_enum(&row.get::<String>(3)?)?,
        user_uid: row.get::<String>(4)?,
        old_values: parse_optional_json(get_opt_string(row, 5)?.as_deref())?,
        new_values: parse_optional_json(get_opt_string(row, 6)?.as_deref())?,
        ip_address: get_opt_string(row, 7)?,
        user_agent: get_opt_string(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

/// Build the WHERE clause and parameter list for a filter.
pub(crate) fn filter_clause(filter: &AuditFilter) -> (String, Vec<libsql::Value>) {
    let mut conditions = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    if let Some(kind) = filter.kind {
        params.push(libsql::Value::Text(kind.as_str().to_string()));
        conditions.push(format!("table_name = ?{}", params.len()));
    }
    if let Some(ref record_id) = filter.record_id {
        params.push(libsql::Value::Text(record_id.clone()));
        conditions.push(format!("record_id = ?{}", params.len()));
    }
    if let Some(ref uid) = filter.user_uid {
        params.push(libsql::Value::Text(uid.clone()));
        conditions.push(format!("user_uid = ?{}", params.len()));
    }
    if let Some(action) = filter.action {
        params.push(libsql::Value::Text(action.as_str().to_string()));
        conditions.push(format!("action = ?{}", params.len()));
    }
    if let Some(from) = filter.from {
        params.push(libsql::Value::Text(from.to_rfc3339()));
        conditions.push(format!("datetime(created_at) >= datetime(?{})", params.len()));
    }
    if let Some(to) = filter.to {
        params.push(libsql::Value::Text(to.to_rfc3339()));
        conditions.push(format!("datetime(created_at) <= datetime(?{})", params.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (where_clause, params)
}

/// Fetch all entries matching a filter with the given ordering, no paging.
pub(crate) async fn query_filtered(
    scope: &libsql::Connection,
    filter: &AuditFilter,
    order: &str,
) -> Result<Vec<AuditLogEntry>, StoreError> {
    let (where_clause, params) = filter_clause(filter);
    let sql =
        format!("SELECT {SELECT_COLS} FROM audit_logs {where_clause} ORDER BY {order}");
    let mut rows = scope.query(&sql, libsql::params_from_iter(params)).await?;
    let mut entries = Vec::new();
    while let Some(row) = rows.next().await? {
        entries.push(row_to_entry(&row)?);
    }
    Ok(entries)
}

impl RotaService {
    /// List audit entries newest-first with the total match count.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Forbidden` without the audit-view capability, or
    /// `StoreError` if a query fails.
    pub async fn list_audit(
        &self,
        actor: &ActorIdentity,
        filter: &AuditFilter,
        page: Page,
    ) -> Result<AuditPage, StoreError> {
        actor.require(Capability::ViewAudit)?;

        let (where_clause, params) = filter_clause(filter);

        let count_sql = format!("SELECT COUNT(*) FROM audit_logs {where_clause}");
        let mut rows = self
            .db()
            .conn()
            .query(&count_sql, libsql::params_from_iter(params.clone()))
            .await?;
        let count = rows
            .next()
            .await?
            .ok_or(StoreError::NoResult)?
            .get::<i64>(0)?;
        let total = u64::try_from(count).unwrap_or_default();

        let sql = format!(
            "SELECT {SELECT_COLS} FROM audit_logs {where_clause}
             ORDER BY datetime(created_at) DESC, id DESC LIMIT {} OFFSET {}",
            page.limit, page.offset
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }

        Ok(AuditPage { entries, total })
    }

    /// Full history of one record, oldest-first, with field-level diffs
    /// attached to update entries.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Forbidden` without the audit-view capability, or
    /// `StoreError` if the query fails.
    pub async fn history(
        &self,
        actor: &ActorIdentity,
        kind: EntityKind,
        record_id: &str,
    ) -> Result<Vec<HistoryEntry>, StoreError> {
        actor.require(Capability::ViewAudit)?;

        let filter = AuditFilter {
            kind: Some(kind),
            record_id: Some(record_id.to_string()),
            ..AuditFilter::default()
        };
        let entries = query_filtered(
            self.db().conn(),
            &filter,
            "datetime(created_at) ASC, id ASC",
        )
        .await?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let changes = if entry.action == AuditAction::Update {
                    let null = serde_json::Value::Null;
                    diff(
                        entry.old_values.as_ref().unwrap_or(&null),
                        entry.new_values.as_ref().unwrap_or(&null),
                    )
                } else {
                    Vec::new()
                };
                HistoryEntry { entry, changes }
            })
            .collect())
    }

    /// Retention sweep: delete entries older than `max_age_days`, returning
    /// the count removed. Idempotent — the only allowed deletion path for
    /// audit entries.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Forbidden` without the purge capability, or
    /// `StoreError` if the DELETE fails.
    pub async fn cleanup_audit(
        &self,
        actor: &ActorIdentity,
        max_age_days: u32,
    ) -> Result<u64, StoreError> {
        actor.require(Capability::PurgeAudit)?;

        let cutoff_modifier = format!("-{max_age_days} days");
        let deleted = self
            .db()
            .conn()
            .execute(
                "DELETE FROM audit_logs WHERE datetime(created_at) < datetime('now', ?1)",
                [cutoff_modifier.as_str()],
            )
            .await?;
        tracing::debug!(deleted, max_age_days, "audit retention sweep");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{admin, at, employee, event_draft, test_service};
    use crate::updates::event::EventUpdateBuilder;
    use rota_core::enums::Team;

    #[tokio::test]
    async fn list_audit_newest_first_with_total() {
        let svc = test_service().await;
        let actor = admin();

        for (i, hour) in [(1u32, 8u32), (2, 10), (3, 12)] {
            svc.create_event(
                &actor,
                event_draft(Team::Bar, &format!("Shift {i}"), (hour, 0), (hour + 1, 0)),
            )
            .await
            .unwrap();
        }

        let page = svc
            .list_audit(
                &actor,
                &AuditFilter::default(),
                Page {
                    limit: 2,
                    offset: 0,
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.entries.len(), 2);
    }

    #[tokio::test]
    async fn list_audit_filters_by_action_and_actor() {
        let svc = test_service().await;
        let actor = admin();

        let event = svc
            .create_event(&actor, event_draft(Team::Bar, "Shift", (10, 0), (11, 0)))
            .await
            .unwrap();
        svc.delete_event(&actor, &event.id).await.unwrap();

        let page = svc
            .list_audit(
                &actor,
                &AuditFilter {
                    action: Some(AuditAction::Delete),
                    user_uid: Some(actor.uid.clone()),
                    ..AuditFilter::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.entries[0].record_id, event.id);
        assert!(page.entries[0].new_values.is_none(), "delete has no post state");
    }

    #[tokio::test]
    async fn audit_queries_require_admin() {
        let svc = test_service().await;
        let staff = employee(Team::Bar);

        let result = svc
            .list_audit(&staff, &AuditFilter::default(), Page::default())
            .await;
        assert!(matches!(result, Err(StoreError::Forbidden(_))));

        let result = svc.cleanup_audit(&staff, 90).await;
        assert!(matches!(result, Err(StoreError::Forbidden(_))));
    }

    #[tokio::test]
    async fn history_is_oldest_first_with_update_diffs() {
        let svc = test_service().await;
        let actor = admin();

        let event = svc
            .create_event(
                &actor,
                event_draft(Team::Animation, "Aquagym", (14, 0), (15, 30)),
            )
            .await
            .unwrap();
        svc.update_event(
            &actor,
            &event.id,
            EventUpdateBuilder::new().title("Water polo").build(),
        )
        .await
        .unwrap();

        let history = svc
            .history(&actor, EntityKind::Events, &event.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].entry.action, AuditAction::Create);
        assert!(history[0].changes.is_empty());
        assert_eq!(history[1].entry.action, AuditAction::Update);

        let changed: Vec<&str> = history[1]
            .changes
            .iter()
            .map(|c| c.field.as_str())
            .collect();
        // Only what actually changed: the title, the modifier, and updated_at.
        assert!(changed.contains(&"title"));
        assert!(changed.contains(&"last_modified_by"));
        assert!(!changed.contains(&"team"));
        assert!(!changed.contains(&"start"));
    }

    #[tokio::test]
    async fn cleanup_is_idempotent() {
        let svc = test_service().await;
        let actor = admin();

        // Backdate an entry past the cutoff by writing it directly.
        let old = chrono::Utc::now() - chrono::Duration::days(120);
        record_audit(
            svc.db().conn(),
            &AuditLogEntry {
                id: "aud-old00001".to_string(),
                table_name: EntityKind::Events,
                record_id: "evt-gone0001".to_string(),
                action: AuditAction::Delete,
                user_uid: actor.uid.clone(),
                old_values: Some(serde_json::json!({"title": "Ancient"})),
                new_values: None,
                ip_address: None,
                user_agent: None,
                created_at: old,
            },
        )
        .await
        .unwrap();

        svc.create_event(&actor, event_draft(Team::Bar, "Recent", (10, 0), (11, 0)))
            .await
            .unwrap();

        assert_eq!(svc.cleanup_audit(&actor, 90).await.unwrap(), 1);
        assert_eq!(svc.cleanup_audit(&actor, 90).await.unwrap(), 0);

        // The recent entry survived.
        let page = svc
            .list_audit(&actor, &AuditFilter::default(), Page::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn date_range_upper_bound_is_inclusive() {
        let svc = test_service().await;
        let actor = admin();

        let instant = at(12, 0);
        record_audit(
            svc.db().conn(),
            &AuditLogEntry {
                id: "aud-fixed0001".to_string(),
                table_name: EntityKind::Events,
                record_id: "evt-fixed0001".to_string(),
                action: AuditAction::Create,
                user_uid: actor.uid.clone(),
                old_values: None,
                new_values: Some(serde_json::json!({"title": "Pinned"})),
                ip_address: None,
                user_agent: None,
                created_at: instant,
            },
        )
        .await
        .unwrap();

        // `to` equal to an entry's created_at still matches it.
        let page = svc
            .list_audit(
                &actor,
                &AuditFilter {
                    to: Some(instant),
                    ..AuditFilter::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn date_range_filter_bounds_results() {
        let svc = test_service().await;
        let actor = admin();
        svc.create_event(&actor, event_draft(Team::Bar, "Now", (10, 0), (11, 0)))
            .await
            .unwrap();

        let page = svc
            .list_audit(
                &actor,
                &AuditFilter {
                    from: Some(at(0, 0) - chrono::Duration::days(365)),
                    to: Some(at(0, 0) - chrono::Duration::days(300)),
                    ..AuditFilter::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }
}
