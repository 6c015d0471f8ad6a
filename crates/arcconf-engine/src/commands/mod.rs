//! Command orchestration layer.
//!
//! Provides high-level command functions that coordinate between
//! core reconciliation logic and the stores.

pub mod archive;
pub mod engine_command;

pub use archive::{
    commit_archive_config, diff_documents, load_archive_config, provision_device,
    sync_archive_config, update_archive_config, SyncOptions, SyncOutcome,
};
pub use engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
