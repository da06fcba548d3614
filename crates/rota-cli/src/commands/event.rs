use serde::Serialize;

use rota_core::entities::EventDraft;
use rota_db::helpers::week_window;
use rota_db::repos::conflict::ConflictingEvent;
use rota_db::updates::event::EventUpdate;

use crate::bootstrap::AppContext;
use crate::cli::subcommands::event::{
    EventAddArgs, EventCommands, EventConflictsArgs, EventEditArgs, EventListArgs,
};
use crate::cli::GlobalFlags;
use crate::commands::parse::{parse_instant, parse_metadata, parse_week};
use crate::output::output;

pub async fn handle(
    action: EventCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        EventCommands::Add(args) => add(args, ctx, flags).await,
        EventCommands::Edit(args) => edit(args, ctx, flags).await,
        EventCommands::Remove { id } => remove(&id, ctx, flags).await,
        EventCommands::Show { id } => show(&id, ctx, flags).await,
        EventCommands::List(args) => list(args, ctx, flags).await,
        EventCommands::Conflicts(args) => conflicts(args, ctx, flags).await,
    }
}

async fn add(args: EventAddArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let draft = EventDraft {
        title: args.title,
        start: parse_instant(&args.start)?,
        end: parse_instant(&args.end)?,
        team: args.team,
        animator: args.animator,
        color: args.color,
        description: args.description,
        metadata: args
            .metadata
            .as_deref()
            .map(parse_metadata)
            .transpose()?
            .unwrap_or_default(),
    };

    let event = ctx.service.create_event(&flags.actor, draft).await?;
    output(&event, flags.json)
}

async fn edit(args: EventEditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let update = EventUpdate {
        title: args.title,
        start: args.start.as_deref().map(parse_instant).transpose()?,
        end: args.end.as_deref().map(parse_instant).transpose()?,
        team: args.team,
        animator: nullable(args.animator, args.clear_animator),
        color: nullable(args.color, args.clear_color),
        description: nullable(args.description, args.clear_description),
        metadata: args.metadata.as_deref().map(parse_metadata).transpose()?,
    };

    let event = ctx.service.update_event(&flags.actor, &args.id, update).await?;
    output(&event, flags.json)
}

/// Fold a set-value flag and a clear flag into the double-option patch
/// encoding. clap rejects passing both.
fn nullable(value: Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

async fn remove(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let event = ctx.service.delete_event(&flags.actor, id).await?;
    if !flags.quiet {
        eprintln!("deleted {}", event.id);
    }
    output(&event, flags.json)
}

async fn show(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let event = ctx.service.get_event(id).await?;
    output(&event, flags.json)
}

async fn list(args: EventListArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let window = match (&args.week, &args.from, &args.to) {
        (Some(week), _, _) => Some(week_window(parse_week(week)?)),
        (None, Some(from), Some(to)) => Some((parse_instant(from)?, parse_instant(to)?)),
        _ => None,
    };

    let events = ctx.service.list_events(args.team, window).await?;
    output(&events, flags.json)
}

#[derive(Debug, Serialize)]
struct ConflictsResponse {
    conflicts: Vec<ConflictingEvent>,
    count: usize,
}

async fn conflicts(
    args: EventConflictsArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let conflicts = ctx
        .service
        .find_conflicts(
            args.team,
            parse_instant(&args.start)?,
            parse_instant(&args.end)?,
            args.exclude.as_deref(),
        )
        .await?;

    let count = conflicts.len();
    output(&ConflictsResponse { conflicts, count }, flags.json)
}
