//! Planning template repository.
//!
//! Templates are team-scoped lists of relative event definitions. They are
//! created explicitly, expanded onto concrete weeks by the derivation engine
//! (which never mutates them), and soft-deactivated rather than hard-deleted.

use chrono::Utc;

use rota_core::entities::{AuditLogEntry, PlanningTemplate, TemplateDraft, TemplateSlot};
use rota_core::enums::{AuditAction, EntityKind, Team};
use rota_core::identity::{ActorIdentity, Capability};
use rota_core::ids::{PREFIX_AUDIT, PREFIX_TEMPLATE};

use crate::error::StoreError;
use crate::generate_id;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::repos::audit::record_audit;
use crate::service::RotaService;

const SELECT_COLS: &str = "id, name, description, team, template_events, created_by, \
                           active, created_at, updated_at";

fn row_to_template(row: &libsql::Row) -> Result<PlanningTemplate, StoreError> {
    let slots: Vec<TemplateSlot> = serde_json::from_str(&row.get::<String>(4)?)
        .map_err(|e| StoreError::Query(format!("Invalid template_events JSON: {e}")))?;
    Ok(PlanningTemplate {
        id: row.get(0)?,
        name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        team: parse_enum(&row.get::<String>(3)?)?,
        template_events: slots,
        created_by: row.get(5)?,
        active: row.get::<i64>(6)? != 0,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

fn snapshot(template: &PlanningTemplate) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(template).map_err(|e| StoreError::Other(e.into()))
}

impl RotaService {
    /// Create a planning template, audited as a CREATE in the same
    /// transaction.
    ///
    /// # Errors
    ///
    /// `Forbidden`, `Validation` (empty name, bad slot), or a storage error.
    pub async fn create_template(
        &self,
        actor: &ActorIdentity,
        draft: TemplateDraft,
    ) -> Result<PlanningTemplate, StoreError> {
        actor.require(Capability::ManageTemplates(draft.team))?;
        draft.validate()?;

        let now = Utc::now();
        let tx = self.db().conn().transaction().await?;
        let id = generate_id(&tx, PREFIX_TEMPLATE).await?;

        let template = PlanningTemplate {
            id,
            name: draft.name,
            description: draft.description,
            team: draft.team,
            template_events: draft.template_events,
            created_by: actor.uid.clone(),
            active: true,
            created_at: now,
            updated_at: now,
        };

        let slots_json = serde_json::to_string(&template.template_events)
            .map_err(|e| StoreError::Other(e.into()))?;
        tx.execute(
            &format!(
                "INSERT INTO planning_templates ({SELECT_COLS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ),
            libsql::params![
                template.id.as_str(),
                template.name.as_str(),
                template.description.as_deref(),
                template.team.as_str(),
                slots_json.as_str(),
                template.created_by.as_str(),
                1i64,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )
        .await?;

        let audit_id = generate_id(&tx, PREFIX_AUDIT).await?;
        record_audit(
            &tx,
            &AuditLogEntry {
                id: audit_id,
                table_name: EntityKind::PlanningTemplates,
                record_id: template.id.clone(),
                action: AuditAction::Create,
                user_uid: actor.uid.clone(),
                old_values: None,
                new_values: Some(snapshot(&template)?),
                ip_address: self.origin().ip_address.clone(),
                user_agent: self.origin().user_agent.clone(),
                created_at: now,
            },
        )
        .await?;

        tx.commit().await?;
        tracing::debug!(id = %template.id, team = %template.team, "template created");
        Ok(template)
    }

    /// Fetch one template by id, active or not.
    ///
    /// # Errors
    ///
    /// `NotFound` or a storage error.
    pub async fn get_template(&self, id: &str) -> Result<PlanningTemplate, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM planning_templates WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or_else(|| StoreError::NotFound {
            kind: EntityKind::PlanningTemplates,
            id: id.to_string(),
        })?;
        row_to_template(&row)
    }

    /// List templates, optionally filtered by team; inactive ones only when
    /// asked for.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn list_templates(
        &self,
        team: Option<Team>,
        include_inactive: bool,
    ) -> Result<Vec<PlanningTemplate>, StoreError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(team) = team {
            params.push(libsql::Value::Text(team.as_str().to_string()));
            conditions.push(format!("team = ?{}", params.len()));
        }
        if !include_inactive {
            conditions.push("active = 1".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {SELECT_COLS} FROM planning_templates {where_clause} ORDER BY name"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut templates = Vec::new();
        while let Some(row) = rows.next().await? {
            templates.push(row_to_template(&row)?);
        }
        Ok(templates)
    }

    /// Soft-deactivate a template, audited as an UPDATE with before/after
    /// snapshots. Deactivating an already-inactive template is a no-op.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden`, or a storage error.
    pub async fn deactivate_template(
        &self,
        actor: &ActorIdentity,
        id: &str,
    ) -> Result<PlanningTemplate, StoreError> {
        let before = self.get_template(id).await?;
        actor.require(Capability::ManageTemplates(before.team))?;
        if !before.active {
            return Ok(before);
        }

        let now = Utc::now();
        let mut after = before.clone();
        after.active = false;
        after.updated_at = now;

        let tx = self.db().conn().transaction().await?;
        tx.execute(
            "UPDATE planning_templates SET active = 0, updated_at = ?1 WHERE id = ?2",
            libsql::params![now.to_rfc3339(), id],
        )
        .await?;

        let audit_id = generate_id(&tx, PREFIX_AUDIT).await?;
        record_audit(
            &tx,
            &AuditLogEntry {
                id: audit_id,
                table_name: EntityKind::PlanningTemplates,
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
        tracing::debug!(id, "template deactivated");
        Ok(after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{admin, employee, manager, template_draft, test_service};

    #[tokio::test]
    async fn create_template_roundtrip() {
        let svc = test_service().await;
        let actor = manager(Team::Animation);

        let template = svc
            .create_template(&actor, template_draft(Team::Animation))
            .await
            .unwrap();
        assert!(template.id.starts_with("tpl-"));
        assert!(template.active);
        assert_eq!(template.template_events.len(), 2);

        let fetched = svc.get_template(&template.id).await.unwrap();
        assert_eq!(fetched, template);
    }

    #[tokio::test]
    async fn employees_cannot_create_templates() {
        let svc = test_service().await;
        let result = svc
            .create_template(&employee(Team::Animation), template_draft(Team::Animation))
            .await;
        assert!(matches!(result, Err(StoreError::Forbidden(_))));
    }

    #[tokio::test]
    async fn invalid_slot_rejected() {
        let svc = test_service().await;
        let mut draft = template_draft(Team::Bar);
        draft.template_events[0].weekday_offset = 9;
        let result = svc.create_template(&admin(), draft).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn deactivate_hides_from_default_listing() {
        let svc = test_service().await;
        let actor = admin();
        let template = svc
            .create_template(&actor, template_draft(Team::Bar))
            .await
            .unwrap();

        let deactivated = svc.deactivate_template(&actor, &template.id).await.unwrap();
        assert!(!deactivated.active);

        assert!(svc.list_templates(Some(Team::Bar), false).await.unwrap().is_empty());
        assert_eq!(svc.list_templates(Some(Team::Bar), true).await.unwrap().len(), 1);

        // Idempotent: second call is a no-op, not an error.
        let again = svc.deactivate_template(&actor, &template.id).await.unwrap();
        assert!(!again.active);
    }

    #[tokio::test]
    async fn missing_template_is_not_found() {
        let svc = test_service().await;
        assert!(matches!(
            svc.get_template("tpl-missing1").await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
