use crate::changelog::{ChangeKind, ChangeRecord};
use crate::diff::{diff, Mutation};
use crate::errors::Result;
use crate::model::entity::Children;
use crate::model::{Entity, Key};
use crate::path::Path;
use crate::reconcile::plan::StoreOp;
use crate::schema::ChildCollection;
use crate::serializer;

/// A store op and the change record it produces, if any
#[derive(Debug, Clone)]
pub(crate) struct Step {
    pub op: StoreOp,
    pub record: Option<ChangeRecord>,
}

/// Outcome of reconciling one child collection
///
/// Steps are grouped by phase: every delete precedes every update, which
/// precede every create, so a path freed by a delete can be reused by a
/// create in the same run.
#[derive(Debug, Clone, Default)]
pub struct CollectionReconciliation {
    /// Keys only in the desired collection
    pub created: Vec<Key>,
    /// Keys present on both sides, whether or not anything changed
    pub updated: Vec<Key>,
    /// Keys only in the stored collection
    pub deleted: Vec<Key>,
    deletes: Vec<Step>,
    updates: Vec<Step>,
    creates: Vec<Step>,
}

impl CollectionReconciliation {
    fn steps(&self) -> impl Iterator<Item = &Step> {
        self.deletes
            .iter()
            .chain(&self.updates)
            .chain(&self.creates)
    }

    pub fn ops(&self) -> impl Iterator<Item = &StoreOp> {
        self.steps().map(|s| &s.op)
    }

    pub fn records(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.steps().filter_map(|s| s.record.as_ref())
    }
}

/// Reconcile the children of one collection under `parent`
///
/// Deleted children become a single `DeleteSubtree`; created children a
/// `CreateSubtree` per entity in their subtree; children on both sides a
/// `Modify` when their own fields differ, followed by the reconciliation of
/// their nested collections.
///
/// # Errors
///
/// Propagates diff failures.
pub fn reconcile_collection(
    parent: &Path,
    collection: &ChildCollection,
    prev: Option<&Children>,
    curr: Option<&Children>,
) -> Result<CollectionReconciliation> {
    let empty = Children::new();
    let prev = prev.unwrap_or(&empty);
    let curr = curr.unwrap_or(&empty);
    let ty = &collection.entity_type;
    let mut out = CollectionReconciliation::default();

    for key in prev.keys().filter(|k| !curr.contains_key(*k)) {
        let path = parent.child(collection.rdn(key));
        out.deletes.push(Step {
            record: Some(ChangeRecord::new(ChangeKind::Deleted, path.clone(), ty, &[])),
            op: StoreOp::DeleteSubtree { path },
        });
        out.deleted.push(key.clone());
    }

    for (key, desired) in curr {
        let path = parent.child(collection.rdn(key));
        match prev.get(key) {
            Some(stored) => {
                let mutations = diff(stored, desired)?;
                if !mutations.is_empty() {
                    out.updates.push(Step {
                        record: Some(ChangeRecord::new(
                            ChangeKind::Updated,
                            path.clone(),
                            ty,
                            &mutations,
                        )),
                        op: StoreOp::Modify {
                            path: path.clone(),
                            mutations,
                        },
                    });
                }
                out.updates
                    .extend(reconcile_children(&path, stored, desired)?);
                out.updated.push(key.clone());
            }
            None => {
                create_steps(&path, desired, &mut out.creates);
                out.created.push(key.clone());
            }
        }
    }

    Ok(out)
}

/// Steps for every collection of two entities of the same type
pub(crate) fn reconcile_children(path: &Path, prev: &Entity, curr: &Entity) -> Result<Vec<Step>> {
    let mut deletes = Vec::new();
    let mut updates = Vec::new();
    let mut creates = Vec::new();
    for collection in &curr.entity_type().children {
        let r = reconcile_collection(
            path,
            collection,
            prev.children(&collection.name),
            curr.children(&collection.name),
        )?;
        deletes.extend(r.deletes);
        updates.extend(r.updates);
        creates.extend(r.creates);
    }
    deletes.extend(updates);
    deletes.extend(creates);
    Ok(deletes)
}

/// Creates for `entity` and its whole subtree, parents first
pub(crate) fn create_steps(path: &Path, entity: &Entity, out: &mut Vec<Step>) {
    let attributes = serializer::serialize_entry(entity);
    let mutations: Vec<Mutation> = attributes
        .iter()
        .map(|a| Mutation::add(a.name.clone(), a.values.clone()))
        .collect();
    out.push(Step {
        record: Some(ChangeRecord::new(
            ChangeKind::Created,
            path.clone(),
            entity.entity_type(),
            &mutations,
        )),
        op: StoreOp::CreateSubtree {
            path: path.clone(),
            attributes,
        },
    });

    for collection in &entity.entity_type().children {
        if let Some(children) = entity.children(&collection.name) {
            for (key, child) in children {
                create_steps(&path.child(collection.rdn(key)), child, out);
            }
        }
    }
}
