//! Verified actor identity and capability checks.
//!
//! Identity verification happens outside the core: every entry point
//! receives an already-verified [`ActorIdentity`] and trusts it. What the
//! core does own is authorization — a single capability check invoked once
//! per operation instead of role/ownership branching re-derived at every
//! call site.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::{Role, Team};
use crate::errors::CoreError;

/// Lightweight verified user identity for cross-crate passing.
///
/// Contains only data fields — no credential logic.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActorIdentity {
    /// Stable user identifier from the external token-verification service.
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Role,
    /// Teams the actor belongs to (manages, for managers).
    pub teams: Vec<Team>,
}

/// A capability an operation requires, checked once at its entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create, update, delete, or derive events for a team.
    ManageEvents(Team),
    /// Create or deactivate planning templates for a team.
    ManageTemplates(Team),
    /// Read the audit log and per-record histories.
    ViewAudit,
    /// Run the audit retention sweep.
    PurgeAudit,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManageEvents(team) => write!(f, "manage_events({team})"),
            Self::ManageTemplates(team) => write!(f, "manage_templates({team})"),
            Self::ViewAudit => f.write_str("view_audit"),
            Self::PurgeAudit => f.write_str("purge_audit"),
        }
    }
}

impl ActorIdentity {
    /// Whether this actor holds the given capability.
    #[must_use]
    pub fn can(&self, capability: Capability) -> bool {
        match capability {
            Capability::ManageEvents(team) => match self.role {
                Role::Admin => true,
                Role::Manager | Role::Employee => self.teams.contains(&team),
            },
            Capability::ManageTemplates(team) => match self.role {
                Role::Admin => true,
                Role::Manager => self.teams.contains(&team),
                Role::Employee => false,
            },
            Capability::ViewAudit | Capability::PurgeAudit => self.role == Role::Admin,
        }
    }

    /// Require a capability, failing with [`CoreError::Forbidden`] otherwise.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Forbidden` naming the actor and the missing
    /// capability.
    pub fn require(&self, capability: Capability) -> Result<(), CoreError> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(CoreError::Forbidden {
                actor: self.uid.clone(),
                capability: capability.to_string(),
            })
        }
    }
}
