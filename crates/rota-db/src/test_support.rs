//! Shared fixtures for the repository tests. Compiled only under `cfg(test)`.

pub(crate) mod helpers {
    use chrono::{DateTime, NaiveDate, Utc};

    use rota_core::entities::{EventDraft, TemplateDraft, TemplateSlot};
    use rota_core::enums::{Role, Team};
    use rota_core::identity::ActorIdentity;

    use crate::service::RotaService;
    use crate::RotaDb;

    /// A fresh service over an in-memory database with migrations applied.
    pub(crate) async fn test_service() -> RotaService {
        let db = RotaDb::open_local(":memory:")
            .await
            .expect("in-memory db opens");
        RotaService::from_db(db)
    }

    pub(crate) fn admin() -> ActorIdentity {
        ActorIdentity {
            uid: "admin-1".to_string(),
            email: Some("admin@example.com".to_string()),
            display_name: Some("Site Admin".to_string()),
            role: Role::Admin,
            teams: Vec::new(),
        }
    }

    pub(crate) fn manager(team: Team) -> ActorIdentity {
        ActorIdentity {
            uid: format!("manager-{team}"),
            email: Some(format!("{team}.manager@example.com")),
            display_name: Some("Team Manager".to_string()),
            role: Role::Manager,
            teams: vec![team],
        }
    }

    pub(crate) fn employee(team: Team) -> ActorIdentity {
        ActorIdentity {
            uid: format!("employee-{team}"),
            email: Some(format!("{team}.employee@example.com")),
            display_name: Some("Team Employee".to_string()),
            role: Role::Employee,
            teams: vec![team],
        }
    }

    /// Fixed test day, a Monday.
    const TEST_DAY: (i32, u32, u32) = (2025, 8, 25);

    /// A time of day on the fixed test date.
    pub(crate) fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        let (y, m, d) = TEST_DAY;
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|day| day.and_hms_opt(hour, minute, 0))
            .expect("valid fixture time")
            .and_utc()
    }

    /// A minimal draft on the fixed test date.
    pub(crate) fn event_draft(
        team: Team,
        title: &str,
        start: (u32, u32),
        end: (u32, u32),
    ) -> EventDraft {
        EventDraft {
            title: title.to_string(),
            start: at(start.0, start.1),
            end: at(end.0, end.1),
            team,
            animator: None,
            color: None,
            description: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// A draft on an explicit calendar day, whole-hour start and end.
    pub(crate) fn event_draft_on(
        team: Team,
        title: &str,
        year: i32,
        month: u32,
        day: u32,
        start_hour: u32,
        end_hour: u32,
    ) -> EventDraft {
        let date = NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date");
        let hms = |hour| {
            date.and_hms_opt(hour, 0, 0)
                .expect("valid fixture time")
                .and_utc()
        };
        EventDraft {
            title: title.to_string(),
            start: hms(start_hour),
            end: hms(end_hour),
            team,
            animator: None,
            color: None,
            description: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// A two-slot weekly template: day 0 at 10:00-11:00 and day 2 at
    /// 14:00-16:00.
    pub(crate) fn template_draft(team: Team) -> TemplateDraft {
        let slot = |title: &str, weekday_offset, start: (u8, u8), end: (u8, u8)| TemplateSlot {
            title: title.to_string(),
            weekday_offset,
            start_hour: start.0,
            start_minute: start.1,
            end_hour: end.0,
            end_minute: end.1,
            animator: None,
            color: None,
            description: None,
            metadata: serde_json::Map::new(),
        };
        TemplateDraft {
            name: "Standard week".to_string(),
            description: Some("Default weekly rotation".to_string()),
            team,
            template_events: vec![
                slot("Morning briefing", 0, (10, 0), (11, 0)),
                slot("Afternoon workshop", 2, (14, 0), (16, 0)),
            ],
        }
    }
}
