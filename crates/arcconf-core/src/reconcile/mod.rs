//! Snapshot reconciliation.
//!
//! Given the stored and the desired snapshot of a configuration subtree,
//! [`reconcile`] produces the ordered store operations that bring the store
//! to the desired state, plus a change log describing them.
//!
//! Root transitions:
//!
//! | stored | desired | effect |
//! |---|---|---|
//! | absent | absent | nothing |
//! | absent | present | `Modify` adding the object class marker and fields, then creates for all children |
//! | present | present | `Modify` for changed fields, then per-collection reconciliation |
//! | present | absent | `Modify` removing fields, subtree deletes, then marker removal |
//!
//! The root entry itself (the device) is never created or deleted here; the
//! root entity is an extension living on an existing entry.
//!
//! Both snapshots are checked for path collisions before any operation is
//! planned.

pub mod collection;
pub mod collision;
pub mod plan;

pub use collection::{reconcile_collection, CollectionReconciliation};
pub use collision::check_path_collisions;
pub use plan::{ReconcilePlan, StoreOp};

use crate::changelog::{ChangeKind, ChangeLog, ChangeRecord, Verbosity};
use crate::diff::{diff, Mutation};
use crate::errors::{ConfError, Result};
use crate::model::Entity;
use crate::path::Path;
use crate::schema::OBJECT_CLASS;
use collection::{reconcile_children, Step};

/// Plan the store operations turning `prev` into `curr` at `path`
///
/// # Errors
///
/// `PathCollision` if either snapshot maps two entities to one path,
/// `TypeMismatch` if the snapshots are of different entity types.
pub fn reconcile(
    path: &Path,
    prev: Option<&Entity>,
    curr: Option<&Entity>,
    verbosity: Verbosity,
) -> Result<ReconcilePlan> {
    reconcile_into(path, prev, curr, ChangeLog::new(verbosity))
}

/// Like [`reconcile`], recording into a caller-provided change log
///
/// # Errors
///
/// See [`reconcile`].
pub fn reconcile_into(
    path: &Path,
    prev: Option<&Entity>,
    curr: Option<&Entity>,
    mut change_log: ChangeLog,
) -> Result<ReconcilePlan> {
    for snapshot in [prev, curr].into_iter().flatten() {
        check_path_collisions(path, snapshot)?;
    }

    let steps = match (prev, curr) {
        (None, None) => Vec::new(),
        (Some(stored), Some(desired)) => update_root(path, stored, desired)?,
        (None, Some(desired)) => attach_root(path, desired)?,
        (Some(stored), None) => detach_root(path, stored)?,
    };

    let mut ops = Vec::with_capacity(steps.len());
    for step in steps {
        if let Some(record) = step.record {
            change_log.push(record);
        }
        ops.push(step.op);
    }

    tracing::debug!(
        path = %path,
        ops_len = ops.len(),
        records_len = change_log.len(),
        "reconciliation planned"
    );
    Ok(ReconcilePlan { ops, change_log })
}

fn update_root(path: &Path, stored: &Entity, desired: &Entity) -> Result<Vec<Step>> {
    if stored.entity_type().name != desired.entity_type().name {
        return Err(ConfError::TypeMismatch {
            field: stored.entity_type().name.clone(),
            expected: desired.entity_type().name.clone(),
        });
    }
    let mut steps = Vec::new();
    let mutations = diff(stored, desired)?;
    if !mutations.is_empty() {
        steps.push(Step {
            record: Some(ChangeRecord::new(
                ChangeKind::Updated,
                path.clone(),
                desired.entity_type(),
                &mutations,
            )),
            op: StoreOp::Modify {
                path: path.clone(),
                mutations,
            },
        });
    }
    steps.extend(reconcile_children(path, stored, desired)?);
    Ok(steps)
}

fn attach_root(path: &Path, desired: &Entity) -> Result<Vec<Step>> {
    let ty = desired.entity_type();
    let blank = Entity::new(ty.clone());
    let mut mutations = vec![Mutation::add(OBJECT_CLASS, vec![ty.object_class.clone()])];
    mutations.extend(diff(&blank, desired)?);

    let mut steps = vec![Step {
        record: Some(ChangeRecord::new(
            ChangeKind::Created,
            path.clone(),
            ty,
            &mutations,
        )),
        op: StoreOp::Modify {
            path: path.clone(),
            mutations,
        },
    }];
    steps.extend(reconcile_children(path, &blank, desired)?);
    Ok(steps)
}

fn detach_root(path: &Path, stored: &Entity) -> Result<Vec<Step>> {
    let ty = stored.entity_type();
    let blank = Entity::new(ty.clone());
    let mutations = diff(stored, &blank)?;
    let marker = Mutation::remove_values(OBJECT_CLASS, vec![ty.object_class.clone()]);

    let mut steps = Vec::new();
    if !mutations.is_empty() {
        steps.push(Step {
            op: StoreOp::Modify {
                path: path.clone(),
                mutations: mutations.clone(),
            },
            record: None,
        });
    }
    steps.extend(reconcile_children(path, stored, &blank)?);

    let mut recorded = mutations;
    recorded.push(marker.clone());
    steps.push(Step {
        record: Some(ChangeRecord::new(
            ChangeKind::Deleted,
            path.clone(),
            ty,
            &recorded,
        )),
        op: StoreOp::Modify {
            path: path.clone(),
            mutations: vec![marker],
        },
    });
    Ok(steps)
}
