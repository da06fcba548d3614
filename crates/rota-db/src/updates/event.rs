//! Event update builder.
//!
//! `None` means "leave unchanged"; for nullable fields the inner `Option`
//! distinguishes "set to value" from "clear". The patch is applied to the
//! loaded row before validation and conflict checking, so the audit entry
//! always carries a fully-merged post-state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use rota_core::entities::Event;
use rota_core::enums::Team;

#[derive(Debug, Clone, Default, Serialize)]
pub struct EventUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animator: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl EventUpdate {
    /// Merge this patch into a loaded event. Identity and timestamp fields
    /// are the store's responsibility, not the patch's.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(ref title) = self.title {
            event.title = title.clone();
        }
        if let Some(start) = self.start {
            event.start = start;
        }
        if let Some(end) = self.end {
            event.end = end;
        }
        if let Some(team) = self.team {
            event.team = team;
        }
        if let Some(ref animator) = self.animator {
            event.animator = animator.clone();
        }
        if let Some(ref color) = self.color {
            event.color = color.clone();
        }
        if let Some(ref description) = self.description {
            event.description = description.clone();
        }
        if let Some(ref metadata) = self.metadata {
            event.metadata = metadata.clone();
        }
    }
}

pub struct EventUpdateBuilder(EventUpdate);

impl EventUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(EventUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub const fn start(mut self, start: DateTime<Utc>) -> Self {
        self.0.start = Some(start);
        self
    }

    #[must_use]
    pub const fn end(mut self, end: DateTime<Utc>) -> Self {
        self.0.end = Some(end);
        self
    }

    #[must_use]
    pub const fn team(mut self, team: Team) -> Self {
        self.0.team = Some(team);
        self
    }

    #[must_use]
    pub fn animator(mut self, animator: Option<String>) -> Self {
        self.0.animator = Some(animator);
        self
    }

    #[must_use]
    pub fn color(mut self, color: Option<String>) -> Self {
        self.0.color = Some(color);
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn metadata(mut self, metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        self.0.metadata = Some(metadata);
        self
    }

    #[must_use]
    pub fn build(self) -> EventUpdate {
        self.0
    }
}

impl Default for EventUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
