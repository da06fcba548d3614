use clap::{Args, Subcommand};

use rota_core::enums::Team;

/// Calendar event commands.
#[derive(Clone, Debug, Subcommand)]
pub enum EventCommands {
    /// Create an event (conflict-checked against its team).
    Add(EventAddArgs),
    /// Update fields of an existing event.
    Edit(EventEditArgs),
    /// Delete an event.
    Remove {
        /// Event id (evt-...).
        id: String,
    },
    /// Show one event.
    Show {
        /// Event id (evt-...).
        id: String,
    },
    /// List events, optionally filtered by team and time window.
    List(EventListArgs),
    /// Report events of a team overlapping a candidate interval.
    Conflicts(EventConflictsArgs),
}

#[derive(Clone, Debug, Args)]
pub struct EventAddArgs {
    /// Event title.
    #[arg(long)]
    pub title: String,
    /// Owning team.
    #[arg(long)]
    pub team: Team,
    /// Start instant (RFC 3339 or "YYYY-MM-DD HH:MM", UTC).
    #[arg(long)]
    pub start: String,
    /// End instant, strictly after start.
    #[arg(long)]
    pub end: String,
    #[arg(long)]
    pub animator: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Extra fields as a JSON object.
    #[arg(long)]
    pub metadata: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct EventEditArgs {
    /// Event id (evt-...).
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub team: Option<Team>,
    #[arg(long)]
    pub start: Option<String>,
    #[arg(long)]
    pub end: Option<String>,
    #[arg(long, conflicts_with = "clear_animator")]
    pub animator: Option<String>,
    /// Clear the animator field.
    #[arg(long)]
    pub clear_animator: bool,
    #[arg(long, conflicts_with = "clear_color")]
    pub color: Option<String>,
    /// Clear the color field.
    #[arg(long)]
    pub clear_color: bool,
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,
    /// Clear the description field.
    #[arg(long)]
    pub clear_description: bool,
    /// Replace the metadata map with this JSON object.
    #[arg(long)]
    pub metadata: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct EventListArgs {
    #[arg(long)]
    pub team: Option<Team>,
    /// Restrict to the week starting on this date (YYYY-MM-DD).
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub week: Option<String>,
    /// Window start instant (inclusive).
    #[arg(long, requires = "to")]
    pub from: Option<String>,
    /// Window end instant (exclusive).
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct EventConflictsArgs {
    #[arg(long)]
    pub team: Team,
    #[arg(long)]
    pub start: String,
    #[arg(long)]
    pub end: String,
    /// Event id to ignore (when probing a move of an existing event).
    #[arg(long)]
    pub exclude: Option<String>,
}
