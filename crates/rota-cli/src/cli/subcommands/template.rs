use std::path::PathBuf;

use clap::{Args, Subcommand};

use rota_core::enums::Team;

/// Planning template commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TemplateCommands {
    /// Create a template from a JSON slot file.
    Create(TemplateCreateArgs),
    /// Expand a template onto a target week.
    Apply(TemplateApplyArgs),
    /// List templates (active only unless --all).
    List(TemplateListArgs),
    /// Soft-deactivate a template.
    Deactivate {
        /// Template id (tpl-...).
        id: String,
    },
}

#[derive(Clone, Debug, Args)]
pub struct TemplateCreateArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub team: Team,
    #[arg(long)]
    pub description: Option<String>,
    /// JSON file holding the slot array.
    #[arg(long)]
    pub slots: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct TemplateApplyArgs {
    /// Template id (tpl-...).
    pub id: String,
    /// Target week start date (YYYY-MM-DD).
    #[arg(long)]
    pub week: String,
    /// Delete the team's target-week events first.
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Clone, Debug, Args)]
pub struct TemplateListArgs {
    #[arg(long)]
    pub team: Option<Team>,
    /// Include deactivated templates.
    #[arg(long)]
    pub all: bool,
}
