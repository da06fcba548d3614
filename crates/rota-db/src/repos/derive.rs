//! Batch derivation engine: week duplication and template application.
//!
//! Both operations are "N creates + optional M deletes, one transaction"
//! rather than a bulk-copy statement — every derived event must receive its
//! own audit trail entry indistinguishable from a manually created one.
//! Auditability dominates raw throughput here. On any failure the entire
//! derivation (deletions and insertions) rolls back.
//!
//! Derived inserts are not conflict-checked individually; `overwrite` is the
//! collision tool. The interactive write path owns overlap prevention.

use chrono::{Duration, NaiveDate, NaiveTime};

use rota_core::entities::{Event, EventDraft, PlanningTemplate, TemplateSlot};
use rota_core::enums::{EntityKind, Team};
use rota_core::identity::{ActorIdentity, Capability};

use crate::error::StoreError;
use crate::helpers::week_window;
use crate::repos::event::{create_event_in, delete_event_in};
use crate::service::{RequestOrigin, RotaService};

/// Result of applying a template: the created events plus the template name
/// for confirmation messaging.
#[derive(Debug)]
pub struct AppliedTemplate {
    pub template_name: String,
    pub events: Vec<Event>,
}

/// Load a team's events starting within `[week_start, week_start + 7 days)`
/// on the given scope.
async fn load_week_in(
    scope: &libsql::Connection,
    team: Team,
    week_start: NaiveDate,
) -> Result<Vec<Event>, StoreError> {
    let (from, to) = week_window(week_start);
    let sql = format!(
        "SELECT {} FROM events
         WHERE team = ?1
           AND datetime(start_time) >= datetime(?2)
           AND datetime(start_time) < datetime(?3)
         ORDER BY datetime(start_time)",
        super::event::SELECT_COLS
    );
    let mut rows = scope
        .query(
            &sql,
            libsql::params![team.as_str(), from.to_rfc3339(), to.to_rfc3339()],
        )
        .await?;
    let mut events = Vec::new();
    while let Some(row) = rows.next().await? {
        events.push(super::event::row_to_event(&row)?);
    }
    Ok(events)
}

/// Delete every event of the target week, each one individually audited —
/// not a bulk delete with a single log line.
async fn purge_week_in(
    scope: &libsql::Connection,
    team: Team,
    week_start: NaiveDate,
    actor_uid: &str,
    origin: &RequestOrigin,
) -> Result<usize, StoreError> {
    let existing = load_week_in(scope, team, week_start).await?;
    let purged = existing.len();
    for event in &existing {
        delete_event_in(scope, event, actor_uid, origin).await?;
    }
    Ok(purged)
}

/// Concrete event draft for one template slot on a target week.
fn slot_to_draft(
    slot: &TemplateSlot,
    team: Team,
    target_week_start: NaiveDate,
) -> Result<EventDraft, StoreError> {
    let day = target_week_start + Duration::days(i64::from(slot.weekday_offset));
    let start_time = NaiveTime::from_hms_opt(u32::from(slot.start_hour), u32::from(slot.start_minute), 0);
    let end_time = NaiveTime::from_hms_opt(u32::from(slot.end_hour), u32::from(slot.end_minute), 0);
    let (Some(start_time), Some(end_time)) = (start_time, end_time) else {
        return Err(StoreError::Validation(format!(
            "template slot '{}' has an out-of-range time",
            slot.title
        )));
    };
    Ok(EventDraft {
        title: slot.title.clone(),
        start: day.and_time(start_time).and_utc(),
        end: day.and_time(end_time).and_utc(),
        team,
        animator: slot.animator.clone(),
        color: slot.color.clone(),
        description: slot.description.clone(),
        metadata: slot.metadata.clone(),
    })
}

impl RotaService {
    /// Copy all of a team's events from one week to another with a uniform
    /// day offset, optionally purging the target week first. All-or-nothing:
    /// deletions and insertions share one transaction.
    ///
    /// # Errors
    ///
    /// `Forbidden`, `EmptySource` if the source week holds no events, or a
    /// storage error (full rollback).
    pub async fn duplicate_week(
        &self,
        actor: &ActorIdentity,
        team: Team,
        source_week_start: NaiveDate,
        target_week_start: NaiveDate,
        overwrite: bool,
    ) -> Result<Vec<Event>, StoreError> {
        actor.require(Capability::ManageEvents(team))?;

        let tx = self.db().conn().transaction().await?;

        let source = load_week_in(&tx, team, source_week_start).await?;
        if source.is_empty() {
            return Err(StoreError::EmptySource);
        }

        if overwrite {
            let purged =
                purge_week_in(&tx, team, target_week_start, &actor.uid, self.origin()).await?;
            tracing::debug!(purged, %team, "target week purged before duplication");
        }

        let day_offset = Duration::days((target_week_start - source_week_start).num_days());
        let mut created = Vec::with_capacity(source.len());
        for event in &source {
            let draft = EventDraft {
                title: event.title.clone(),
                start: event.start + day_offset,
                end: event.end + day_offset,
                team: event.team,
                animator: event.animator.clone(),
                color: event.color.clone(),
                description: event.description.clone(),
                metadata: event.metadata.clone(),
            };
            created.push(create_event_in(&tx, &draft, &actor.uid, self.origin()).await?);
        }

        tx.commit().await?;
        tracing::info!(
            count = created.len(),
            %team,
            %source_week_start,
            %target_week_start,
            "week duplicated"
        );
        Ok(created)
    }

    /// Expand a stored template onto a concrete target week, optionally
    /// purging the team's existing target-week events first. One
    /// transaction; partial application is not a valid outcome.
    ///
    /// # Errors
    ///
    /// `NotFound` if the template is missing or inactive, `Forbidden`, or a
    /// storage error (full rollback).
    pub async fn apply_template(
        &self,
        actor: &ActorIdentity,
        template_id: &str,
        target_week_start: NaiveDate,
        overwrite: bool,
    ) -> Result<AppliedTemplate, StoreError> {
        let template: PlanningTemplate = self.get_template(template_id).await?;
        if !template.active {
            return Err(StoreError::NotFound {
                kind: EntityKind::PlanningTemplates,
                id: template_id.to_string(),
            });
        }
        actor.require(Capability::ManageEvents(template.team))?;

        let tx = self.db().conn().transaction().await?;

        if overwrite {
            let purged = purge_week_in(
                &tx,
                template.team,
                target_week_start,
                &actor.uid,
                self.origin(),
            )
            .await?;
            tracing::debug!(purged, team = %template.team, "target week purged before template application");
        }

        let mut events = Vec::with_capacity(template.template_events.len());
        for slot in &template.template_events {
            let draft = slot_to_draft(slot, template.team, target_week_start)?;
            events.push(create_event_in(&tx, &draft, &actor.uid, self.origin()).await?);
        }

        tx.commit().await?;
        tracing::info!(
            count = events.len(),
            template = %template.name,
            %target_week_start,
            "template applied"
        );
        Ok(AppliedTemplate {
            template_name: template.name,
            events,
        })
    }
}
