use clap::{Parser, Subcommand};

use rota_core::enums::{Role, Team};
use rota_core::identity::ActorIdentity;

pub mod subcommands;

use subcommands::{AuditCommands, EventCommands, TemplateCommands, WeekCommands};

/// Top-level CLI parser for the `rota` binary.
#[derive(Debug, Parser)]
#[command(name = "rota", version, about = "Rota - multi-team calendar with audit trail")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (overrides config)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Emit JSON instead of human-readable tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Acting user id recorded in the audit trail
    #[arg(long, global = true, default_value = "local-admin")]
    pub actor: String,

    /// Acting user role: admin, manager, employee
    #[arg(long, global = true, default_value = "admin")]
    pub role: Role,

    /// Teams the acting user belongs to (comma-separated)
    #[arg(long, global = true, value_delimiter = ',')]
    pub teams: Vec<Team>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage calendar events.
    Event {
        #[command(subcommand)]
        action: EventCommands,
    },
    /// Week-level batch operations.
    Week {
        #[command(subcommand)]
        action: WeekCommands,
    },
    /// Manage planning templates.
    Template {
        #[command(subcommand)]
        action: TemplateCommands,
    },
    /// Inspect and maintain the audit trail.
    Audit {
        #[command(subcommand)]
        action: AuditCommands,
    },
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub db: Option<String>,
    pub json: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub actor: ActorIdentity,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            db: self.db.clone(),
            json: self.json,
            quiet: self.quiet,
            verbose: self.verbose,
            actor: ActorIdentity {
                uid: self.actor.clone(),
                email: None,
                display_name: None,
                role: self.role,
                teams: self.teams.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands};
    use rota_core::enums::{Role, Team};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "rota",
            "--db",
            "/tmp/rota.db",
            "--json",
            "--verbose",
            "event",
            "list",
        ])
        .expect("cli should parse");

        assert_eq!(cli.db.as_deref(), Some("/tmp/rota.db"));
        assert!(cli.json);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Event { .. }));
    }

    #[test]
    fn actor_flags_build_an_identity() {
        let cli = Cli::try_parse_from([
            "rota",
            "--actor",
            "usr-42",
            "--role",
            "manager",
            "--teams",
            "bar,snack",
            "event",
            "list",
        ])
        .expect("cli should parse");

        let flags = cli.global_flags();
        assert_eq!(flags.actor.uid, "usr-42");
        assert_eq!(flags.actor.role, Role::Manager);
        assert_eq!(flags.actor.teams, vec![Team::Bar, Team::Snack]);
    }

    #[test]
    fn role_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["rota", "--role", "superuser", "event", "list"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn default_actor_is_local_admin() {
        let cli = Cli::try_parse_from(["rota", "event", "list"]).expect("cli should parse");
        let flags = cli.global_flags();
        assert_eq!(flags.actor.uid, "local-admin");
        assert_eq!(flags.actor.role, Role::Admin);
    }
}
