use crate::bootstrap::AppContext;
use crate::cli::{Commands, GlobalFlags};

pub mod audit;
pub mod event;
pub mod parse;
pub mod template;
pub mod week;

pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Event { action } => event::handle(action, ctx, flags).await,
        Commands::Week { action } => week::handle(action, ctx, flags).await,
        Commands::Template { action } => template::handle(action, ctx, flags).await,
        Commands::Audit { action } => audit::handle(action, ctx, flags).await,
    }
}
