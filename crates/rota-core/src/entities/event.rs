use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Team;
use crate::errors::CoreError;

/// Maximum length of an event title.
pub const MAX_TITLE_LEN: usize = 200;

/// One scheduled occurrence for one team.
///
/// Intervals are half-open `[start, end)`: back-to-back events (end of one
/// equals start of the next) do not overlap.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub team: Team,
    pub animator: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub created_by: String,
    /// Null until the first update.
    pub last_modified_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating an event. Identity and timestamps
/// are filled in by the store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EventDraft {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub team: Team,
    #[serde(default)]
    pub animator: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl EventDraft {
    /// Check the event field invariants: non-empty title within the length
    /// cap, end strictly after start.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if an invariant is violated.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_title(&self.title)?;
        validate_interval(self.start, self.end)
    }
}

/// Shared title invariant: non-empty after trimming, at most
/// [`MAX_TITLE_LEN`] characters.
///
/// # Errors
///
/// Returns `CoreError::Validation` when the title is empty or too long.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "title exceeds {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Shared interval invariant: end strictly after start.
///
/// # Errors
///
/// Returns `CoreError::Validation` when `end <= start`.
pub fn validate_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), CoreError> {
    if end <= start {
        return Err(CoreError::Validation(
            "end must be strictly after start".into(),
        ));
    }
    Ok(())
}
