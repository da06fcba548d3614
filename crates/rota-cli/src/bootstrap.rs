//! Startup wiring: configuration, database, and the service handle.

use std::path::Path;

use anyhow::Context;

use rota_config::RotaConfig;
use rota_db::service::RotaService;

use crate::cli::GlobalFlags;

/// Everything a command handler needs.
pub struct AppContext {
    pub config: RotaConfig,
    pub service: RotaService,
}

impl AppContext {
    /// Load layered configuration, open (and migrate) the database, and
    /// build the service. `--db` overrides the configured path.
    pub async fn init(flags: &GlobalFlags) -> anyhow::Result<Self> {
        let config = RotaConfig::load_with_dotenv().context("failed to load configuration")?;

        let db_path = flags
            .db
            .clone()
            .unwrap_or_else(|| config.database.path.clone());

        if db_path != ":memory:" {
            if let Some(parent) = Path::new(&db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create database directory '{}'", parent.display())
                    })?;
                }
            }
        }

        let service = RotaService::new_local(&db_path)
            .await
            .with_context(|| format!("failed to open database at '{db_path}'"))?;

        Ok(Self { config, service })
    }
}
