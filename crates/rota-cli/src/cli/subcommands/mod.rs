pub mod audit;
pub mod event;
pub mod template;
pub mod week;

pub use audit::AuditCommands;
pub use event::EventCommands;
pub use template::TemplateCommands;
pub use week::WeekCommands;
