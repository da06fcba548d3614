use std::path::PathBuf;

use clap::{Args, Subcommand};

use rota_core::enums::{AuditAction, EntityKind};

/// Audit trail commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuditCommands {
    /// List audit entries, newest first.
    List(AuditListArgs),
    /// Show a record's full change history with field-level diffs.
    History {
        /// Entity kind: events, planning_templates.
        kind: EntityKind,
        /// Record id (evt-... or tpl-...).
        id: String,
    },
    /// Export the filtered audit trail as CSV.
    Export(AuditExportArgs),
    /// Delete audit entries older than the retention window.
    Cleanup {
        /// Retention in days (defaults to the configured retention_days).
        #[arg(long)]
        max_age_days: Option<u32>,
    },
}

#[derive(Clone, Debug, Args)]
pub struct AuditFilterArgs {
    /// Entity kind: events, planning_templates.
    #[arg(long)]
    pub kind: Option<EntityKind>,
    /// Record id.
    #[arg(long)]
    pub record: Option<String>,
    /// Acting user id.
    #[arg(long)]
    pub user: Option<String>,
    /// Action: create, update, delete.
    #[arg(long)]
    pub action: Option<AuditAction>,
    /// Entries at or after this instant.
    #[arg(long)]
    pub from: Option<String>,
    /// Entries at or before this instant.
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct AuditListArgs {
    #[command(flatten)]
    pub filter: AuditFilterArgs,
    /// Page size (defaults to the configured default_limit).
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Clone, Debug, Args)]
pub struct AuditExportArgs {
    #[command(flatten)]
    pub filter: AuditFilterArgs,
    /// Write CSV here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// JSON file mapping user ids to {"email", "name"} for the export columns.
    #[arg(long)]
    pub actors: Option<PathBuf>,
}
