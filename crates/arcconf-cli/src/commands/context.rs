//! Setup shared by the store-backed commands: config, logging, database

use arcconf_core::logging_facility;
use arcconf_engine::EngineConfig;
use arcconf_store::SqliteDirectory;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Engine config file (YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database; overrides the config file
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Entry under which device entries live; overrides the config file
    #[arg(long, global = true)]
    pub device_base: Option<String>,
}

/// Load the config, apply flag overrides and start logging
pub fn load_config(global: &GlobalArgs) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let mut config = match &global.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(db) = &global.db {
        config.database = db.clone();
    }
    if let Some(base) = &global.device_base {
        config.device_base = base.clone();
        config.device_base_path()?;
    }

    logging_facility::init(config.log_profile);
    Ok(config)
}

/// Open the configured database, creating its directory if needed
pub fn open_store(config: &EngineConfig) -> Result<SqliteDirectory, Box<dyn std::error::Error>> {
    if let Some(parent) = config
        .database
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(SqliteDirectory::open(&config.database)?)
}
