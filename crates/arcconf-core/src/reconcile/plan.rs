use crate::changelog::ChangeLog;
use crate::diff::Mutation;
use crate::model::AttributeSet;
use crate::path::Path;
use serde::{Deserialize, Serialize};

/// One store call, in the order the plan must issue it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreOp {
    /// Create a single entry; its descendants follow as further creates
    CreateSubtree {
        path: Path,
        attributes: AttributeSet,
    },
    Modify {
        path: Path,
        mutations: Vec<Mutation>,
    },
    /// Delete an entry and everything below it
    DeleteSubtree { path: Path },
}

impl StoreOp {
    pub fn path(&self) -> &Path {
        match self {
            StoreOp::CreateSubtree { path, .. }
            | StoreOp::Modify { path, .. }
            | StoreOp::DeleteSubtree { path } => path,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StoreOp::CreateSubtree { .. } => "create_subtree",
            StoreOp::Modify { .. } => "modify_attributes",
            StoreOp::DeleteSubtree { .. } => "delete_subtree",
        }
    }
}

/// Store operations plus the change log describing them
#[derive(Debug, Clone)]
pub struct ReconcilePlan {
    pub ops: Vec<StoreOp>,
    pub change_log: ChangeLog,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
