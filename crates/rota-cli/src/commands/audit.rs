use std::collections::HashMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use rota_db::export::ActorProfile;
use rota_db::repos::audit::{AuditFilter, Page};

use crate::bootstrap::AppContext;
use crate::cli::subcommands::audit::{
    AuditCommands, AuditExportArgs, AuditFilterArgs, AuditListArgs,
};
use crate::cli::GlobalFlags;
use crate::commands::parse::parse_instant;
use crate::output::output;

pub async fn handle(
    action: AuditCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AuditCommands::List(args) => list(args, ctx, flags).await,
        AuditCommands::History { kind, id } => history(kind, &id, ctx, flags).await,
        AuditCommands::Export(args) => export(args, ctx, flags).await,
        AuditCommands::Cleanup { max_age_days } => cleanup(max_age_days, ctx, flags).await,
    }
}

fn to_filter(args: &AuditFilterArgs) -> anyhow::Result<AuditFilter> {
    Ok(AuditFilter {
        kind: args.kind,
        record_id: args.record.clone(),
        user_uid: args.user.clone(),
        action: args.action,
        from: args.from.as_deref().map(parse_instant).transpose()?,
        to: args.to.as_deref().map(parse_instant).transpose()?,
    })
}

async fn list(args: AuditListArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let page = Page {
        limit: args.limit.unwrap_or(ctx.config.audit.default_limit),
        offset: args.offset,
    };
    let result = ctx
        .service
        .list_audit(&flags.actor, &to_filter(&args.filter)?, page)
        .await?;
    output(&result, flags.json)
}

async fn history(
    kind: rota_core::enums::EntityKind,
    id: &str,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let entries = ctx.service.history(&flags.actor, kind, id).await?;
    output(&entries, flags.json)
}

/// Shape of one `--actors` file entry.
#[derive(Debug, Deserialize)]
struct ActorFileEntry {
    email: String,
    name: String,
}

async fn export(
    args: AuditExportArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let actors = match &args.actors {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read actors file '{}'", path.display()))?;
            let entries: HashMap<String, ActorFileEntry> = serde_json::from_str(&raw)
                .with_context(|| format!("invalid actors JSON in '{}'", path.display()))?;
            entries
                .into_iter()
                .map(|(uid, entry)| {
                    (
                        uid,
                        ActorProfile {
                            email: entry.email,
                            name: entry.name,
                        },
                    )
                })
                .collect()
        }
        None => HashMap::new(),
    };

    let csv = ctx
        .service
        .export_audit(&flags.actor, &to_filter(&args.filter)?, &actors)
        .await?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            if !flags.quiet {
                eprintln!("wrote {}", path.display());
            }
        }
        None => print!("{csv}"),
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct CleanupResponse {
    max_age_days: u32,
    deleted: u64,
}

async fn cleanup(
    max_age_days: Option<u32>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let max_age_days = max_age_days.unwrap_or(ctx.config.audit.retention_days);
    let deleted = ctx.service.cleanup_audit(&flags.actor, max_age_days).await?;
    output(
        &CleanupResponse {
            max_age_days,
            deleted,
        },
        flags.json,
    )
}
