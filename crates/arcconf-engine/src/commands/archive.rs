//! Archive configuration commands with boundary logging.
//!
//! This module provides the command handlers for one device's archive
//! extension:
//! - Provision the device entry and its ancestors
//! - Load the stored snapshot
//! - Sync a desired snapshot against a known stored one
//! - Update from the store (load, then sync)
//! - Commit to SQLite atomically, recording the run
//! - Diff two documents without touching any store
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging for these operations:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, core) use only `tracing::debug!()` and
//! `tracing::warn!()` for internal details.

#![allow(clippy::result_large_err)]

use arcconf_core::apply::apply_plan;
use arcconf_core::changelog::{ChangeLog, Verbosity};
use arcconf_core::directory::DirectoryStore;
use arcconf_core::errors::{ExError, ExErrorKind};
use arcconf_core::load::{load_snapshot, LoadOutcome};
use arcconf_core::model::{AttributeSet, Entity};
use arcconf_core::path::Path;
use arcconf_core::reconcile::{reconcile_into, ReconcilePlan, StoreOp};
use arcconf_core::schema::{Schema, OBJECT_CLASS};
use arcconf_core::{log_op_end, log_op_error, log_op_start};
use arcconf_core_types::RequestContext;
use arcconf_store::documents::ArchiveDocument;
use arcconf_store::errors::Result;
use arcconf_store::repo::{record_run, SqliteDirectory};
use std::time::Instant;

const DEVICE_OBJECT_CLASS: &str = "dicomDevice";

/// Options for sync operations.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Change-log detail; never changes what is written
    pub verbosity: Verbosity,
    /// Plan and report, but apply nothing
    pub dry_run: bool,
    /// Correlation ids; the request id becomes the change log's run id
    pub context: RequestContext,
}

/// Outcome of a sync.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub change_log: ChangeLog,
    /// Planned ops, in application order
    pub ops: Vec<StoreOp>,
    /// Ops applied to the store; 0 on a dry run
    pub applied: usize,
}

/// Ensure the device entry at `device` and all of its ancestors exist
///
/// Missing ancestors are created bare; a missing device entry gets the
/// device object class and its name attribute. Existing entries are left
/// untouched.
///
/// ## Returns
///
/// The number of entries created.
pub fn provision_device<S>(store: &mut S, device: &Path) -> Result<usize>
where
    S: DirectoryStore + ?Sized,
{
    log_op_start!("provision_device", path = %device);
    let start = Instant::now();

    let result = provision_device_impl(store, device).map_err(|e| {
        log_op_error!(
            "provision_device",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "provision_device",
        duration_ms = start.elapsed().as_millis() as u64,
        created = result
    );
    Ok(result)
}

fn provision_device_impl<S>(store: &mut S, device: &Path) -> Result<usize>
where
    S: DirectoryStore + ?Sized,
{
    let Some(rdn) = device.rdn() else {
        return Err(ExError::new(ExErrorKind::InvalidPath)
            .with_op("provision_device")
            .with_message("device path is empty"));
    };

    // Ancestors root first, then the device itself
    let mut missing = Vec::new();
    let mut cursor = Some(device.clone());
    while let Some(path) = cursor.filter(|p| !p.is_empty()) {
        if store.exists(&path)? {
            break;
        }
        cursor = path.parent();
        missing.push(path);
    }

    let created = missing.len();
    for path in missing.into_iter().rev() {
        let attributes = if &path == device {
            let mut attrs =
                AttributeSet::new().with(OBJECT_CLASS, vec![DEVICE_OBJECT_CLASS.to_string()]);
            for (attribute, value) in rdn.pairs() {
                attrs.insert(attribute.clone(), vec![value.clone()]);
            }
            attrs
        } else {
            AttributeSet::new()
        };
        store.create_subtree(&path, &attributes)?;
    }
    Ok(created)
}

/// Load the archive snapshot stored at `device`
///
/// `None` when the device has no archive extension. Entries skipped for
/// unusable keys are reported in the outcome.
pub fn load_archive_config<S>(
    store: &S,
    device: &Path,
    schema: &Schema,
) -> Result<Option<LoadOutcome>>
where
    S: DirectoryStore + ?Sized,
{
    log_op_start!("load_archive_config", path = %device);
    let start = Instant::now();

    let result = load_snapshot(store, device, schema.root())
        .map_err(ExError::from)
        .map_err(|e| {
            log_op_error!(
                "load_archive_config",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "load_archive_config",
        duration_ms = start.elapsed().as_millis() as u64,
        found = result.is_some(),
        skipped_len = result.as_ref().map_or(0, |o| o.skipped.len())
    );
    Ok(result)
}

/// Reconcile `prev` into `curr` at `device` and, unless dry-running, apply
///
/// Path collisions abort before anything is written. Store failures stop
/// the run with earlier ops left applied; use [`commit_archive_config`] for
/// an all-or-nothing run against SQLite.
pub fn sync_archive_config<S>(
    store: &mut S,
    device: &Path,
    prev: Option<&Entity>,
    curr: Option<&Entity>,
    options: &SyncOptions,
) -> Result<SyncOutcome>
where
    S: DirectoryStore + ?Sized,
{
    log_op_start!(
        "sync_archive_config",
        path = %device,
        request_id = %options.context.request_id,
        dry_run = options.dry_run
    );
    let start = Instant::now();

    let result = sync_archive_config_impl(store, device, prev, curr, options).map_err(|e| {
        log_op_error!(
            "sync_archive_config",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "sync_archive_config",
        duration_ms = start.elapsed().as_millis() as u64,
        ops_len = result.ops.len(),
        records_len = result.change_log.len(),
        applied = result.applied
    );
    Ok(result)
}

fn sync_archive_config_impl<S>(
    store: &mut S,
    device: &Path,
    prev: Option<&Entity>,
    curr: Option<&Entity>,
    options: &SyncOptions,
) -> Result<SyncOutcome>
where
    S: DirectoryStore + ?Sized,
{
    let plan = plan_sync(device, prev, curr, options)?;
    let applied = if options.dry_run {
        0
    } else {
        apply_plan(store, &plan)?
    };
    Ok(SyncOutcome {
        change_log: plan.change_log,
        ops: plan.ops,
        applied,
    })
}

/// Load the stored snapshot at `device`, then sync `curr` against it
pub fn update_archive_config<S>(
    store: &mut S,
    device: &Path,
    schema: &Schema,
    curr: Option<&Entity>,
    options: &SyncOptions,
) -> Result<SyncOutcome>
where
    S: DirectoryStore + ?Sized,
{
    log_op_start!("update_archive_config", path = %device);
    let start = Instant::now();

    let result = load_archive_config(store, device, schema)
        .and_then(|prev| {
            let prev = prev.map(|o| o.entity);
            sync_archive_config(store, device, prev.as_ref(), curr, options)
        })
        .map_err(|e| {
            log_op_error!(
                "update_archive_config",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "update_archive_config",
        duration_ms = start.elapsed().as_millis() as u64,
        ops_len = result.ops.len()
    );
    Ok(result)
}

/// Like [`update_archive_config`], applying the plan in one SQLite
/// transaction and recording the run in the ledger
///
/// A dry run plans and reports without opening a transaction.
pub fn commit_archive_config(
    store: &mut SqliteDirectory,
    device: &Path,
    schema: &Schema,
    curr: Option<&Entity>,
    options: &SyncOptions,
) -> Result<SyncOutcome> {
    log_op_start!(
        "commit_archive_config",
        path = %device,
        request_id = %options.context.request_id,
        dry_run = options.dry_run
    );
    let start = Instant::now();

    let result = commit_archive_config_impl(store, device, schema, curr, options).map_err(|e| {
        log_op_error!(
            "commit_archive_config",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "commit_archive_config",
        duration_ms = start.elapsed().as_millis() as u64,
        ops_len = result.ops.len(),
        applied = result.applied
    );
    Ok(result)
}

fn commit_archive_config_impl(
    store: &mut SqliteDirectory,
    device: &Path,
    schema: &Schema,
    curr: Option<&Entity>,
    options: &SyncOptions,
) -> Result<SyncOutcome> {
    let prev = load_snapshot(store, device, schema.root())?.map(|o| o.entity);
    let plan = plan_sync(device, prev.as_ref(), curr, options)?;

    let mut applied = 0;
    if !options.dry_run && !plan.is_empty() {
        applied = store.apply_atomically_with(&plan, |tx, applied| {
            record_run(tx, device, &plan.change_log, applied)
        })?;
    }
    Ok(SyncOutcome {
        change_log: plan.change_log,
        ops: plan.ops,
        applied,
    })
}

/// Plan the changes from one document to another, touching no store
///
/// Both documents must name the same device, which is placed below
/// `device_base`.
pub fn diff_documents(
    schema: &Schema,
    device_base: &Path,
    prev: &ArchiveDocument,
    curr: &ArchiveDocument,
    verbosity: Verbosity,
) -> Result<ReconcilePlan> {
    log_op_start!("diff_documents", device = %curr.device);
    let start = Instant::now();

    let result = diff_documents_impl(schema, device_base, prev, curr, verbosity).map_err(|e| {
        log_op_error!(
            "diff_documents",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "diff_documents",
        duration_ms = start.elapsed().as_millis() as u64,
        ops_len = result.ops.len()
    );
    Ok(result)
}

fn diff_documents_impl(
    schema: &Schema,
    device_base: &Path,
    prev: &ArchiveDocument,
    curr: &ArchiveDocument,
    verbosity: Verbosity,
) -> Result<ReconcilePlan> {
    if prev.device != curr.device {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("diff_documents")
            .with_message(format!(
                "documents describe different devices: {} and {}",
                prev.device, curr.device
            )));
    }
    for archive in [&prev.archive, &curr.archive].into_iter().flatten() {
        if archive.entity_type().name != schema.root().name {
            return Err(ExError::new(ExErrorKind::TypeMismatch)
                .with_op("diff_documents")
                .with_entity_type(archive.entity_type().name.clone()));
        }
    }

    let device = device_base.child(arcconf_core::path::Rdn::single(
        crate::config::DEVICE_NAME_ATTRIBUTE,
        curr.device.clone(),
    ));
    let options = SyncOptions {
        verbosity,
        ..SyncOptions::default()
    };
    plan_sync(&device, prev.archive.as_ref(), curr.archive.as_ref(), &options)
}

fn plan_sync(
    device: &Path,
    prev: Option<&Entity>,
    curr: Option<&Entity>,
    options: &SyncOptions,
) -> Result<ReconcilePlan> {
    let change_log =
        ChangeLog::new(options.verbosity).with_run_id(options.context.request_id.clone());
    Ok(reconcile_into(device, prev, curr, change_log)?)
}
