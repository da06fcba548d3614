use anyhow::Context;
use serde::Serialize;

use rota_core::entities::{Event, TemplateDraft, TemplateSlot};

use crate::bootstrap::AppContext;
use crate::cli::subcommands::template::{
    TemplateApplyArgs, TemplateCommands, TemplateCreateArgs, TemplateListArgs,
};
use crate::cli::GlobalFlags;
use crate::commands::parse::parse_week;
use crate::output::output;

pub async fn handle(
    action: TemplateCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        TemplateCommands::Create(args) => create(args, ctx, flags).await,
        TemplateCommands::Apply(args) => apply(args, ctx, flags).await,
        TemplateCommands::List(args) => list(args, ctx, flags).await,
        TemplateCommands::Deactivate { id } => deactivate(&id, ctx, flags).await,
    }
}

async fn create(
    args: TemplateCreateArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.slots)
        .with_context(|| format!("failed to read slot file '{}'", args.slots.display()))?;
    let template_events: Vec<TemplateSlot> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid slot JSON in '{}'", args.slots.display()))?;

    let draft = TemplateDraft {
        name: args.name,
        description: args.description,
        team: args.team,
        template_events,
    };

    let template = ctx.service.create_template(&flags.actor, draft).await?;
    output(&template, flags.json)
}

#[derive(Debug, Serialize)]
struct ApplyResponse {
    template_name: String,
    created: Vec<Event>,
    count: usize,
}

async fn apply(
    args: TemplateApplyArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let applied = ctx
        .service
        .apply_template(
            &flags.actor,
            &args.id,
            parse_week(&args.week)?,
            args.overwrite,
        )
        .await?;

    let count = applied.events.len();
    if !flags.quiet {
        eprintln!(
            "applied '{}': {count} events on week {}",
            applied.template_name, args.week
        );
    }
    output(
        &ApplyResponse {
            template_name: applied.template_name,
            created: applied.events,
            count,
        },
        flags.json,
    )
}

async fn list(
    args: TemplateListArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let templates = ctx.service.list_templates(args.team, args.all).await?;
    output(&templates, flags.json)
}

async fn deactivate(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let template = ctx.service.deactivate_template(&flags.actor, id).await?;
    if !flags.quiet {
        eprintln!("deactivated {}", template.id);
    }
    output(&template, flags.json)
}
