//! Interval-conflict detector.
//!
//! A pure query with no side effects, callable repeatedly — it has to
//! compose with week duplication and template application, which issue many
//! writes per invocation. The check is advisory: it reads the current
//! transaction's view immediately before a write, so two concurrent
//! transactions targeting the same team and window can both pass and both
//! commit. That race is accepted and documented, not masked; a storage-level
//! exclusion constraint would change the observable error shape.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use rota_core::enums::Team;

use crate::error::StoreError;
use crate::helpers::parse_datetime;
use crate::service::RotaService;

/// An existing event that overlaps a candidate interval. Carries enough
/// detail (id, title, interval) for a human to resolve the conflict.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConflictingEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Find existing events for `team` whose `[start, end)` interval overlaps
/// the candidate, on the given scope (connection or open transaction).
///
/// Half-open overlap is the single inequality pair `s1 < e2 AND s2 < e1` —
/// no case analysis for "starts during" / "ends during" / containment, which
/// risks missing the "existing fully contains new" case. `exclude_id` omits
/// an event's own row when an update is checked against itself.
///
/// # Errors
///
/// Returns `StoreError` if the query fails.
pub async fn find_conflicts_in(
    scope: &libsql::Connection,
    team: Team,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_id: Option<&str>,
) -> Result<Vec<ConflictingEvent>, StoreError> {
    // datetime() normalizes mixed-precision RFC 3339 text before comparing.
    let mut sql = String::from(
        "SELECT id, title, start_time, end_time FROM events
         WHERE team = ?1
           AND datetime(start_time) < datetime(?3)
           AND datetime(end_time) > datetime(?2)",
    );
    if exclude_id.is_some() {
        sql.push_str(" AND id != ?4");
    }
    sql.push_str(" ORDER BY datetime(start_time)");

    let params = libsql::params_from_iter(
        [
            Some(team.as_str().to_string()),
            Some(start.to_rfc3339()),
            Some(end.to_rfc3339()),
            exclude_id.map(String::from),
        ]
        .into_iter()
        .flatten(),
    );

    let mut rows = scope.query(&sql, params).await?;
    let mut conflicts = Vec::new();
    while let Some(row) = rows.next().await? {
        conflicts.push(ConflictingEvent {
            id: row.get::<String>(0)?,
            title: row.get::<String>(1)?,
            start: parse_datetime(&row.get::<String>(2)?)?,
            end: parse_datetime(&row.get::<String>(3)?)?,
        });
    }
    Ok(conflicts)
}

impl RotaService {
    /// Conflict-check query surface for callers (e.g., a pre-submit
    /// "check before you book" flow).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn find_conflicts(
        &self,
        team: Team,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> Result<Vec<ConflictingEvent>, StoreError> {
        find_conflicts_in(self.db().conn(), team, start, end, exclude_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{admin, at, event_draft, test_service};
    use rstest::rstest;

    #[rstest]
    // New starts during existing
    #[case((10, 0), (11, 0), (10, 30), (11, 30), true)]
    // Back-to-back: half-open boundary is not a conflict
    #[case((10, 0), (11, 0), (11, 0), (12, 0), false)]
    // Existing fully contains new
    #[case((9, 0), (12, 0), (10, 0), (11, 0), true)]
    // New fully contains existing
    #[case((10, 0), (11, 0), (9, 0), (12, 0), true)]
    // Disjoint
    #[case((10, 0), (11, 0), (14, 0), (15, 0), false)]
    #[tokio::test]
    async fn overlap_predicate(
        #[case] existing_start: (u32, u32),
        #[case] existing_end: (u32, u32),
        #[case] candidate_start: (u32, u32),
        #[case] candidate_end: (u32, u32),
        #[case] expect_conflict: bool,
    ) {
        let svc = test_service().await;
        let actor = admin();
        svc.create_event(
            &actor,
            event_draft(Team::Animation, "Existing", existing_start, existing_end),
        )
        .await
        .unwrap();

        let conflicts = svc
            .find_conflicts(
                Team::Animation,
                at(candidate_start.0, candidate_start.1),
                at(candidate_end.0, candidate_end.1),
                None,
            )
            .await
            .unwrap();
        assert_eq!(!conflicts.is_empty(), expect_conflict);
    }

    #[tokio::test]
    async fn conflicts_are_scoped_per_team() {
        let svc = test_service().await;
        let actor = admin();
        svc.create_event(&actor, event_draft(Team::Bar, "Bar shift", (10, 0), (12, 0)))
            .await
            .unwrap();

        let conflicts = svc
            .find_conflicts(Team::Animation, at(10, 0), at(12, 0), None)
            .await
            .unwrap();
        assert!(conflicts.is_empty(), "other teams' events never conflict");
    }

    #[tokio::test]
    async fn exclude_id_omits_own_row() {
        let svc = test_service().await;
        let actor = admin();
        let event = svc
            .create_event(
                &actor,
                event_draft(Team::Animation, "Aquagym", (10, 0), (11, 0)),
            )
            .await
            .unwrap();

        let conflicts = svc
            .find_conflicts(Team::Animation, at(10, 0), at(11, 0), Some(&event.id))
            .await
            .unwrap();
        assert!(conflicts.is_empty());

        let conflicts = svc
            .find_conflicts(Team::Animation, at(10, 0), at(11, 0), None)
            .await
            .unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].id, event.id);
        assert_eq!(conflicts[0].title, "Aquagym");
    }
}
