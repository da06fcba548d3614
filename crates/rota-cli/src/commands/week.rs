use serde::Serialize;

use rota_core::entities::Event;

use crate::bootstrap::AppContext;
use crate::cli::subcommands::week::{WeekCommands, WeekDuplicateArgs};
use crate::cli::GlobalFlags;
use crate::commands::parse::parse_week;
use crate::output::output;

pub async fn handle(
    action: WeekCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        WeekCommands::Duplicate(args) => duplicate(args, ctx, flags).await,
    }
}

#[derive(Debug, Serialize)]
struct DuplicateResponse {
    created: Vec<Event>,
    count: usize,
}

async fn duplicate(
    args: WeekDuplicateArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let created = ctx
        .service
        .duplicate_week(
            &flags.actor,
            args.team,
            parse_week(&args.from)?,
            parse_week(&args.to)?,
            args.overwrite,
        )
        .await?;

    let count = created.len();
    if !flags.quiet {
        eprintln!("duplicated {count} events onto week {}", args.to);
    }
    output(&DuplicateResponse { created, count }, flags.json)
}
