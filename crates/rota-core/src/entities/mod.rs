//! Entity structs for all Rota domain objects.
//!
//! Each entity maps to a table in the libSQL database. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip and
//! snapshot serialization in the audit trail.

mod audit;
pub mod event;
mod template;

pub use audit::AuditLogEntry;
pub use event::{Event, EventDraft};
pub use template::{PlanningTemplate, TemplateDraft, TemplateSlot};
