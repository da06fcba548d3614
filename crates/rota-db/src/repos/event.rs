//! Event store operations — create/update/delete, each one transaction
//! bracketing the row mutation and its audit entry.
//!
//! The `*_in` free functions take an explicit scope (an open transaction)
//! so the derivation engine can compose many of them inside one outer
//! transaction; the public service methods wrap a single call in its own
//! transaction. No operation touches storage except through the scope it is
//! given.

use chrono::{DateTime, Utc};

use rota_core::entities::{AuditLogEntry, Event, EventDraft};
use rota_core::entities::event::{validate_interval, validate_title};
use rota_core::enums::{AuditAction, EntityKind, Team};
use rota_core::identity::{ActorIdentity, Capability};
use rota_core::ids::{PREFIX_AUDIT, PREFIX_EVENT};

use crate::error::StoreError;
use crate::generate_id;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_json_map};
use crate::repos::audit::record_audit;
use crate::repos::conflict::find_conflicts_in;
use crate::service::{RequestOrigin, RotaService};
use crate::updates::event::EventUpdate;

pub(crate) const SELECT_COLS: &str = "id, title, start_time, end_time, team, animator, color, \
                           description, metadata, created_by, last_modified_by, \
                           created_at, updated_at";

pub(crate) fn row_to_event(row: &libsql::Row) -> Result<Event, StoreError> {
    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        start: parse_datetime(&row.get::<String>(2)?)?,
        end: parse_datetime(&row.get::<String>(3)?)?,
        team: parse_enum(&row.get::<String>(4)?)?,
        animator: get_opt_string(row, 5)?,
        color: get_opt_string(row, 6)?,
        description: get_opt_string(row, 7)?,
        metadata: parse_json_map(get_opt_string(row, 8)?.as_deref())?,
        created_by: row.get(9)?,
        last_modified_by: get_opt_string(row, 10)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

fn snapshot(event: &Event) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(event).map_err(|e| StoreError::Other(e.into()))
}

/// Read one event on the given scope, failing with `NotFound` if absent.
///
/// # Errors
///
/// Returns `StoreError::NotFound` or a query error.
pub(crate) async fn get_event_in(
    scope: &libsql::Connection,
    id: &str,
) -> Result<Event, StoreError> {
    let mut rows = scope
        .query(
            &format!("SELECT {SELECT_COLS} FROM events WHERE id = ?1"),
            [id],
        )
        .await?;
    let row = rows.next().await?.ok_or_else(|| StoreError::NotFound {
        kind: EntityKind::Events,
        id: id.to_string(),
    })?;
    row_to_event(&row)
}

async fn insert_event_in(scope: &libsql::Connection, event: &Event) -> Result<(), StoreError> {
    scope
        .execute(
            &format!(
                "INSERT INTO events ({SELECT_COLS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
            ),
            libsql::params![
                event.id.as_str(),
                event.title.as_str(),
                event.start.to_rfc3339(),
                event.end.to_rfc3339(),
                event.team.as_str(),
                event.animator.as_deref(),
                event.color.as_deref(),
                event.description.as_deref(),
                serde_json::Value::Object(event.metadata.clone()).to_string(),
                event.created_by.as_str(),
                event.last_modified_by.as_deref(),
                event.created_at.to_rfc3339(),
                event.updated_at.to_rfc3339()
            ],
        )
        .await?;
    Ok(())
}

/// Insert a new event and its CREATE audit entry on the given scope.
///
/// The derivation engine calls this once per derived event so every copy
/// receives an audit trail entry indistinguishable from a manual create.
///
/// # Errors
///
/// Returns `StoreError` if the insert or the audit append fails; the caller's
/// transaction must then roll back.
pub(crate) async fn create_event_in(
    scope: &libsql::Connection,
    draft: &EventDraft,
    actor_uid: &str,
    origin: &RequestOrigin,
) -> Result<Event, StoreError> {
    let now = Utc::now();
    let id = generate_id(scope, PREFIX_EVENT).await?;

    let event = Event {
        id,
        title: draft.title.clone(),
        start: draft.start,
        end: draft.end,
        team: draft.team,
        animator: draft.animator.clone(),
        color: draft.color.clone(),
        description: draft.description.clone(),
        metadata: draft.metadata.clone(),
        created_by: actor_uid.to_string(),
        last_modified_by: None,
        created_at: now,
        updated_at: now,
    };
    insert_event_in(scope, &event).await?;

    let audit_id = generate_id(scope, PREFIX_AUDIT).await?;
    record_audit(
        scope,
        &AuditLogEntry {
            id: audit_id,
            table_name: EntityKind::Events,
            record_id: event.id.clone(),
            action: AuditAction::Create,
            user_uid: actor_uid.to_string(),
            old_values: None,
            new_values: Some(snapshot(&event)?),
            ip_address: origin.ip_address.clone(),
            user_agent: origin.user_agent.clone(),
            created_at: now,
        },
    )
    .await?;

    Ok(event)
}

/// Delete an already-loaded event and append its DELETE audit entry on the
/// given scope.
///
/// # Errors
///
/// Returns `StoreError` if the delete or the audit append fails.
pub(crate) async fn delete_event_in(
    scope: &libsql::Connection,
    event: &Event,
    actor_uid: &str,
    origin: &RequestOrigin,
) -> Result<(), StoreError> {
    scope
        .execute("DELETE FROM events WHERE id = ?1", [event.id.as_str()])
        .await?;

    let audit_id = generate_id(scope, PREFIX_AUDIT).await?;
    record_audit(
        scope,
        &AuditLogEntry {
            id: audit_id,
            table_name: EntityKind::Events,
            record_id: event.id.clone(),
            action: AuditAction::Delete,
            user_uid: actor_uid.to_string(),
            old_values: Some(snapshot(event)?),
            new_values: None,
            ip_address: origin.ip_address.clone(),
            user_agent: origin.user_agent.clone(),
            created_at: Utc::now(),
        },
    )
    .await?;
    Ok(())
}

impl RotaService {
    /// Create an event: capability check, field invariants, conflict check,
    /// then insert + CREATE audit entry in one transaction.
    ///
    /// # Errors
    ///
    /// `Forbidden`, `Validation`, `Conflict` (with the overlapping events),
    /// or a storage error — in which case nothing is committed.
    pub async fn create_event(
        &self,
        actor: &ActorIdentity,
        draft: EventDraft,
    ) -> Result<Event, StoreError> {
        actor.require(Capability::ManageEvents(draft.team))?;
        draft.validate()?;

        let tx = self.db().conn().transaction().await?;

        let conflicts =
            find_conflicts_in(&tx, draft.team, draft.start, draft.end, None).await?;
        if !conflicts.is_empty() {
            return Err(StoreError::Conflict(conflicts));
        }

        let event = create_event_in(&tx, &draft, &actor.uid, self.origin()).await?;
        tx.commit().await?;
        tracing::debug!(id = %event.id, team = %event.team, "event created");
        Ok(event)
    }

    /// Update an event: read, apply the patch, re-check invariants and
    /// conflicts (excluding the event's own row), write, UPDATE audit entry
    /// with full before/after snapshots — one transaction.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden`, `Validation`, `Conflict`, or a storage error.
    pub async fn update_event(
        &self,
        actor: &ActorIdentity,
        id: &str,
        update: EventUpdate,
    ) -> Result<Event, StoreError> {
        let tx = self.db().conn().transaction().await?;

        let before = get_event_in(&tx, id).await?;
        actor.require(Capability::ManageEvents(before.team))?;

        let mut after = before.clone();
        update.apply_to(&mut after);
        if after.team != before.team {
            actor.require(Capability::ManageEvents(after.team))?;
        }
        validate_title(&after.title)?;
        validate_interval(after.start, after.end)?;

        let conflicts =
            find_conflicts_in(&tx, after.team, after.start, after.end, Some(id)).await?;
        if !conflicts.is_empty() {
            return Err(StoreError::Conflict(conflicts));
        }

        let now = Utc::now();
        after.last_modified_by = Some(actor.uid.clone());
        after.updated_at = now;

        tx.execute(
            "UPDATE events SET title = ?1, start_time = ?2, end_time = ?3, team = ?4,
                    animator = ?5, color = ?6, description = ?7, metadata = ?8,
                    last_modified_by = ?9, updated_at = ?10
             WHERE id = ?11",
            libsql::params![
                after.title.as_str(),
                after.start.to_rfc3339(),
                after.end.to_rfc3339(),
                after.team.as_str(),
                after.animator.as_deref(),
                after.color.as_deref(),
                after.description.as_deref(),
                serde_json::Value::Object(after.metadata.clone()).to_string(),
                after.last_modified_by.as_deref(),
                after.updated_at.to_rfc3339(),
                id
            ],
        )
        .await?;

        let audit_id = generate_id(&tx, PREFIX_AUDIT).await?;
        record_audit(
            &tx,
            &AuditLogEntry {
                id: audit_id,
                table_name: EntityKind::Events,
                record_id: id.to_string(),
                action: AuditAction::Update,
                user_uid: actor.uid.clone(),
                old_values: Some(snapshot(&before)?),
                new_values: Some(snapshot(&after)?),
                ip_address: self.origin().ip_address.clone(),
                user_agent: self.origin().user_agent.clone(),
                created_at: now,
            },
        )
        .await?;

        tx.commit().await?;
        tracing::debug!(id, "event updated");
        Ok(after)
    }

    /// Delete an event: read, remove, DELETE audit entry with the full prior
    /// state — one transaction. Returns the deleted row for caller display.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden`, or a storage error.
    pub async fn delete_event(
        &self,
        actor: &ActorIdentity,
        id: &str,
    ) -> Result<Event, StoreError> {
        let tx = self.db().conn().transaction().await?;

        let event = get_event_in(&tx, id).await?;
        actor.require(Capability::ManageEvents(event.team))?;

        delete_event_in(&tx, &event, &actor.uid, self.origin()).await?;
        tx.commit().await?;
        tracing::debug!(id, "event deleted");
        Ok(event)
    }

    /// Fetch one event by id.
    ///
    /// # Errors
    ///
    /// `NotFound` or a storage error.
    pub async fn get_event(&self, id: &str) -> Result<Event, StoreError> {
        get_event_in(self.db().conn(), id).await
    }

    /// List events, optionally filtered by team and/or a half-open start
    /// window, ordered by start.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn list_events(
        &self,
        team: Option<Team>,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Event>, StoreError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(team) = team {
            params.push(libsql::Value::Text(team.as_str().to_string()));
            conditions.push(format!("team = ?{}", params.len()));
        }
        if let Some((from, to)) = window {
            params.push(libsql::Value::Text(from.to_rfc3339()));
            conditions.push(format!("datetime(start_time) >= datetime(?{})", params.len()));
            params.push(libsql::Value::Text(to.to_rfc3339()));
            conditions.push(format!("datetime(start_time) < datetime(?{})", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {SELECT_COLS} FROM events {where_clause} ORDER BY datetime(start_time)"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut events = Vec::new();
        while let Some(row) = rows.next().await? {
            events.push(row_to_event(&row)?);
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::{AuditFilter, Page};
    use crate::test_support::helpers::{admin, at, employee, event_draft, test_service};
    use crate::updates::event::EventUpdateBuilder;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_event_roundtrip() {
        let svc = test_service().await;
        let actor = admin();

        let mut draft = event_draft(Team::Animation, "Aquagym", (14, 0), (15, 30));
        draft.animator = Some("Lea".to_string());
        draft
            .metadata
            .insert("room".to_string(), serde_json::json!("pool"));

        let event = svc.create_event(&actor, draft).await.unwrap();
        assert!(event.id.starts_with("evt-"));
        assert_eq!(event.created_by, actor.uid);
        assert_eq!(event.last_modified_by, None);

        let fetched = svc.get_event(&event.id).await.unwrap();
        assert_eq!(fetched, event);
    }

    #[tokio::test]
    async fn overlapping_create_reports_conflict_with_details() {
        let svc = test_service().await;
        let actor = admin();

        let first = svc
            .create_event(
                &actor,
                event_draft(Team::Animation, "E1", (14, 0), (15, 30)),
            )
            .await
            .unwrap();

        let result = svc
            .create_event(
                &actor,
                event_draft(Team::Animation, "E2", (15, 0), (16, 0)),
            )
            .await;
        match result {
            Err(StoreError::Conflict(conflicts)) => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].id, first.id);
                assert_eq!(conflicts[0].title, "E1");
                assert_eq!(conflicts[0].start, at(14, 0));
            }
            other => panic!("expected Conflict, got {other:?}"),
        }

        // Conflict is an expected outcome: nothing was committed.
        let events = svc.list_events(Some(Team::Animation), None).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn no_overlap_after_any_committed_write() {
        let svc = test_service().await;
        let actor = admin();

        for (title, start, end) in [
            ("A", (8, 0), (9, 0)),
            ("B", (9, 0), (10, 0)),
            ("C", (10, 30), (11, 0)),
        ] {
            svc.create_event(&actor, event_draft(Team::Bar, title, start, end))
                .await
                .unwrap();
        }
        // Attempts that would overlap are rejected.
        assert!(
            svc.create_event(&actor, event_draft(Team::Bar, "X", (8, 30), (9, 30)))
                .await
                .is_err()
        );

        let events = svc.list_events(Some(Team::Bar), None).await.unwrap();
        for (i, a) in events.iter().enumerate() {
            for b in &events[i + 1..] {
                assert!(
                    a.end <= b.start || b.end <= a.start,
                    "stored overlap: {} and {}",
                    a.title,
                    b.title
                );
            }
        }
    }

    #[tokio::test]
    async fn update_applies_patch_and_sets_modifier() {
        let svc = test_service().await;
        let actor = admin();
        let event = svc
            .create_event(&actor, event_draft(Team::Bar, "Shift", (10, 0), (11, 0)))
            .await
            .unwrap();

        let updated = svc
            .update_event(
                &actor,
                &event.id,
                EventUpdateBuilder::new()
                    .title("Evening shift")
                    .color(Some("#00ff00".to_string()))
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Evening shift");
        assert_eq!(updated.color.as_deref(), Some("#00ff00"));
        assert_eq!(updated.last_modified_by.as_deref(), Some(actor.uid.as_str()));
        // Unchanged fields survive.
        assert_eq!(updated.start, event.start);
    }

    #[tokio::test]
    async fn update_same_interval_does_not_conflict_with_itself() {
        let svc = test_service().await;
        let actor = admin();
        let event = svc
            .create_event(&actor, event_draft(Team::Bar, "Shift", (10, 0), (11, 0)))
            .await
            .unwrap();

        // Only the title changes; the untouched interval must not trip the
        // conflict detector on the event's own row.
        let result = svc
            .update_event(
                &actor,
                &event.id,
                EventUpdateBuilder::new().title("Renamed").build(),
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn update_into_occupied_interval_conflicts() {
        let svc = test_service().await;
        let actor = admin();
        svc.create_event(&actor, event_draft(Team::Bar, "First", (10, 0), (11, 0)))
            .await
            .unwrap();
        let second = svc
            .create_event(&actor, event_draft(Team::Bar, "Second", (12, 0), (13, 0)))
            .await
            .unwrap();

        let result = svc
            .update_event(
                &actor,
                &second.id,
                EventUpdateBuilder::new().start(at(10, 30)).end(at(11, 30)).build(),
            )
            .await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_missing_event_is_not_found() {
        let svc = test_service().await;
        let result = svc
            .update_event(
                &admin(),
                "evt-missing1",
                EventUpdateBuilder::new().title("x").build(),
            )
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn delete_returns_row_and_audits_prior_state() {
        let svc = test_service().await;
        let actor = admin();
        let event = svc
            .create_event(&actor, event_draft(Team::Bar, "Doomed", (10, 0), (11, 0)))
            .await
            .unwrap();

        let deleted = svc.delete_event(&actor, &event.id).await.unwrap();
        assert_eq!(deleted.title, "Doomed");
        assert!(matches!(
            svc.get_event(&event.id).await,
            Err(StoreError::NotFound { .. })
        ));

        let page = svc
            .list_audit(
                &actor,
                &AuditFilter {
                    record_id: Some(event.id.clone()),
                    ..AuditFilter::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 2); // create + delete
    }

    #[tokio::test]
    async fn employee_cannot_touch_other_teams() {
        let svc = test_service().await;
        let bar_staff = employee(Team::Bar);

        let result = svc
            .create_event(
                &bar_staff,
                event_draft(Team::Animation, "Nope", (10, 0), (11, 0)),
            )
            .await;
        assert!(matches!(result, Err(StoreError::Forbidden(_))));
    }

    #[tokio::test]
    async fn failed_audit_append_rolls_back_the_event() {
        let svc = test_service().await;
        let actor = admin();

        // Sabotage the audit table: the CREATE audit append inside the
        // transaction must now fail, taking the event insert down with it.
        svc.db()
            .conn()
            .execute("ALTER TABLE audit_logs RENAME TO audit_logs_gone", ())
            .await
            .unwrap();

        let result = svc
            .create_event(&actor, event_draft(Team::Bar, "Ghost", (10, 0), (11, 0)))
            .await;
        assert!(result.is_err());

        svc.db()
            .conn()
            .execute("ALTER TABLE audit_logs_gone RENAME TO audit_logs", ())
            .await
            .unwrap();
        let events = svc.list_events(None, None).await.unwrap();
        assert!(events.is_empty(), "rolled-back event must not exist");
    }

    #[tokio::test]
    async fn invalid_draft_rejected_before_any_write() {
        let svc = test_service().await;
        let result = svc
            .create_event(&admin(), event_draft(Team::Bar, "", (10, 0), (11, 0)))
            .await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }
}
