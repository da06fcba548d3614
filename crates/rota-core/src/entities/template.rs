use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::event::validate_title;
use crate::enums::Team;
use crate::errors::CoreError;

/// A reusable, team-scoped list of relative event definitions.
///
/// Applying a template to a target week expands each slot into a concrete
/// event; the template itself is never mutated by application. Templates are
/// soft-deactivated via the `active` flag rather than hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PlanningTemplate {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub team: Team,
    pub template_events: Vec<TemplateSlot>,
    pub created_by: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One relative event definition inside a template: a day-of-week offset
/// from the target week's Monday plus start/end times of day.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TemplateSlot {
    pub title: String,
    /// 0 = the target week's first day, through 6.
    pub weekday_offset: u8,
    pub start_hour: u8,
    pub start_minute: u8,
    pub end_hour: u8,
    pub end_minute: u8,
    #[serde(default)]
    pub animator: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl TemplateSlot {
    /// Check the slot invariants: valid weekday offset, in-range times,
    /// end after start, non-empty title.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if an invariant is violated.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_title(&self.title)?;
        if self.weekday_offset > 6 {
            return Err(CoreError::Validation(format!(
                "weekday_offset must be 0-6, got {}",
                self.weekday_offset
            )));
        }
        for (label, hour, minute) in [
            ("start", self.start_hour, self.start_minute),
            ("end", self.end_hour, self.end_minute),
        ] {
            if hour > 23 || minute > 59 {
                return Err(CoreError::Validation(format!(
                    "{label} time {hour:02}:{minute:02} is out of range"
                )));
            }
        }
        let start = (u16::from(self.start_hour), u16::from(self.start_minute));
        let end = (u16::from(self.end_hour), u16::from(self.end_minute));
        if end <= start {
            return Err(CoreError::Validation(
                "slot end time must be after start time".into(),
            ));
        }
        Ok(())
    }
}

/// Caller-supplied fields for creating a template.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TemplateDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub team: Team,
    pub template_events: Vec<TemplateSlot>,
}

impl TemplateDraft {
    /// Validate the template name and every slot.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the name is empty or any slot is
    /// invalid.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_title(&self.name)?;
        for slot in &self.template_events {
            slot.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(weekday_offset: u8, start: (u8, u8), end: (u8, u8)) -> TemplateSlot {
        TemplateSlot {
            title: "Morning shift".to_string(),
            weekday_offset,
            start_hour: start.0,
            start_minute: start.1,
            end_hour: end.0,
            end_minute: end.1,
            animator: None,
            color: None,
            description: None,
            metadata: serde_json::Map::new(),
        }
    }

    #[test]
    fn valid_slot_passes() {
        assert!(slot(0, (10, 0), (11, 30)).validate().is_ok());
    }

    #[test]
    fn weekday_offset_beyond_week_rejected() {
        assert!(slot(7, (10, 0), (11, 0)).validate().is_err());
    }

    #[test]
    fn out_of_range_time_rejected() {
        assert!(slot(0, (24, 0), (25, 0)).validate().is_err());
        assert!(slot(0, (10, 60), (11, 0)).validate().is_err());
    }

    #[test]
    fn end_not_after_start_rejected() {
        assert!(slot(0, (11, 0), (11, 0)).validate().is_err());
        assert!(slot(0, (11, 30), (11, 0)).validate().is_err());
    }

    #[test]
    fn minute_granularity_compares_correctly() {
        // 09:30 -> 10:00 is a valid slot even though end_minute < start_minute.
        assert!(slot(0, (9, 30), (10, 0)).validate().is_ok());
    }
}
