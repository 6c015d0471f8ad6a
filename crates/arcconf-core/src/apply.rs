//! Plan execution against a directory store
//!
//! ## Ordering Contract
//!
//! Operations are issued one at a time, in plan order. Later operations may
//! depend on earlier ones (a child create needs its parent), so execution
//! stops at the first failure and the error is returned unchanged. Nothing
//! already applied is rolled back here; stores that can do better expose
//! their own atomic wrapper (see `SqliteDirectory::apply_atomically`).
//!
//! ## Example
//!
//! ```
//! use arcconf_core::apply::apply_plan;
//! use arcconf_core::changelog::Verbosity;
//! use arcconf_core::directory::{DirectoryStore, MemoryDirectory};
//! use arcconf_core::model::{AttributeSet, Entity};
//! use arcconf_core::path::Path;
//! use arcconf_core::reconcile::reconcile;
//! use arcconf_core::schema::Schema;
//!
//! let schema = Schema::archive().unwrap();
//! let device = Path::parse("dicomDeviceName=arc").unwrap();
//! let mut store = MemoryDirectory::new();
//! store.create_subtree(&device, &AttributeSet::new()).unwrap();
//!
//! let desired = Entity::new(schema.root().clone());
//! let plan = reconcile(&device, None, Some(&desired), Verbosity::Summary).unwrap();
//! assert_eq!(apply_plan(&mut store, &plan).unwrap(), 1);
//! ```

use crate::directory::DirectoryStore;
use crate::errors::Result;
use crate::reconcile::{ReconcilePlan, StoreOp};

/// Execute every operation of `plan`, returning how many were applied
///
/// # Errors
///
/// The first store error, as reported by the store.
pub fn apply_plan<S>(store: &mut S, plan: &ReconcilePlan) -> Result<usize>
where
    S: DirectoryStore + ?Sized,
{
    apply_ops(store, &plan.ops)
}

/// Execute `ops` in order
///
/// # Errors
///
/// The first store error, as reported by the store.
pub fn apply_ops<S>(store: &mut S, ops: &[StoreOp]) -> Result<usize>
where
    S: DirectoryStore + ?Sized,
{
    for (applied, op) in ops.iter().enumerate() {
        let result = match op {
            StoreOp::CreateSubtree { path, attributes } => store.create_subtree(path, attributes),
            StoreOp::Modify { path, mutations } => store.modify_attributes(path, mutations),
            StoreOp::DeleteSubtree { path } => store.delete_subtree(path),
        };
        if let Err(err) = result {
            tracing::warn!(
                op = op.name(),
                path = %op.path(),
                applied,
                remaining = ops.len() - applied,
                error = %err,
                "store operation failed; earlier operations remain applied"
            );
            return Err(err);
        }
    }
    Ok(ops.len())
}
