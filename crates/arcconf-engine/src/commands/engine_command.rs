//! Engine-level commands dispatched against a directory store.

#![allow(clippy::result_large_err)]

use crate::commands::archive::{
    load_archive_config, provision_device, sync_archive_config, update_archive_config,
    SyncOptions, SyncOutcome,
};
use arcconf_core::directory::DirectoryStore;
use arcconf_core::load::LoadOutcome;
use arcconf_core::model::Entity;
use arcconf_core::path::Path;
use arcconf_core::schema::Schema;
use arcconf_store::errors::Result;

/// Commands that read or write one device's configuration.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Create the device entry and any missing ancestors.
    Provision { device: Path },
    /// Read the stored archive snapshot.
    Load { device: Path },
    /// Reconcile against a caller-supplied stored snapshot.
    Sync {
        device: Path,
        prev: Option<Entity>,
        curr: Option<Entity>,
        options: SyncOptions,
    },
    /// Reconcile against the snapshot loaded from the store.
    Update {
        device: Path,
        curr: Option<Entity>,
        options: SyncOptions,
    },
}

/// Result of applying an engine command.
#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    Provisioned { created: usize },
    Loaded(Option<LoadOutcome>),
    Synced(SyncOutcome),
}

/// Apply an engine command to `store`.
pub fn apply_engine_command<S>(
    cmd: EngineCommand,
    store: &mut S,
    schema: &Schema,
) -> Result<EngineCommandResult>
where
    S: DirectoryStore + ?Sized,
{
    match cmd {
        EngineCommand::Provision { device } => Ok(EngineCommandResult::Provisioned {
            created: provision_device(store, &device)?,
        }),
        EngineCommand::Load { device } => Ok(EngineCommandResult::Loaded(load_archive_config(
            store, &device, schema,
        )?)),
        EngineCommand::Sync {
            device,
            prev,
            curr,
            options,
        } => Ok(EngineCommandResult::Synced(sync_archive_config(
            store,
            &device,
            prev.as_ref(),
            curr.as_ref(),
            &options,
        )?)),
        EngineCommand::Update {
            device,
            curr,
            options,
        } => Ok(EngineCommandResult::Synced(update_archive_config(
            store,
            &device,
            schema,
            curr.as_ref(),
            &options,
        )?)),
    }
}
