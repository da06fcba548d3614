use clap::{Args, Subcommand};

use rota_core::enums::Team;

/// Week-level batch operations.
#[derive(Clone, Debug, Subcommand)]
pub enum WeekCommands {
    /// Copy a team's week of events onto another week.
    Duplicate(WeekDuplicateArgs),
}

#[derive(Clone, Debug, Args)]
pub struct WeekDuplicateArgs {
    #[arg(long)]
    pub team: Team,
    /// Source week start date (YYYY-MM-DD).
    #[arg(long)]
    pub from: String,
    /// Target week start date (YYYY-MM-DD).
    #[arg(long)]
    pub to: String,
    /// Delete the target week's existing events first (each deletion audited).
    #[arg(long)]
    pub overwrite: bool,
}
