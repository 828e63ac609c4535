//! Node removal planning.
//!
//! [`plan_delete`] works out the removed ids and the writes needed for the
//! nodes that survive; a store commits the [`DeletePlan`] atomically.
//!
//! [`DeleteStrategy::DeleteAll`] drops the subtree rooted at the target.
//! [`DeleteStrategy::PromoteChildren`] drops only the target: its children
//! take over its slot in the parent's sibling group, keep their relative
//! order, and the group is renumbered densely.
//!
//! On the wire the strategy is a PascalCase string and [`DeleteResult`] uses
//! camelCase field names.
//!
//! ## Examples
//!
//! ```rust
//! use notetree_core::{DeleteStrategy, DeleteResult};
//!
//! let strategy = DeleteStrategy::PromoteChildren;
//! let json = serde_json::to_string(&strategy).unwrap();
//! assert_eq!(json, r#""PromoteChildren""#);
//!
//! let result = DeleteResult {
//!     deleted_count: 1,
//!     affected_ids: vec!["a".to_string(), "b".to_string()],
//! };
//! let json = serde_json::to_string(&result).unwrap();
//! assert!(json.contains("deletedCount"));
//! assert!(json.contains("affectedIds"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::plan::{apply_updates, group, OrderUpdate};
use crate::core::query::descendants_in;
use crate::core::snapshot::SnapshotIndex;
use crate::{NodeRecord, OrderAllocator, Result, TreeError};

/// Determines how children are handled when a node is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DeleteStrategy {
    /// Delete the target node and all of its descendants.
    DeleteAll,

    /// Delete only the target node and re-parent its children to its former parent.
    PromoteChildren,
}

/// Summary of a delete for the UI: how many nodes went away and which ids
/// were deleted or structurally affected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    /// The total number of nodes removed.
    pub deleted_count: usize,

    /// IDs of all nodes that were deleted or re-parented by the operation.
    pub affected_ids: Vec<String>,
}

/// A validated delete.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletePlan {
    pub strategy: DeleteStrategy,
    /// Removed ids, target first, then descendants in pre-order.
    pub deleted_ids: Vec<String>,
    /// Writes for surviving nodes (promoted children and renumbered siblings).
    pub updates: Vec<OrderUpdate>,
    /// Direct children that change parent under `PromoteChildren`.
    pub promoted_ids: Vec<String>,
}

impl DeletePlan {
    /// Returns a new snapshot with the plan committed.
    #[must_use]
    pub fn apply(&self, nodes: &[NodeRecord]) -> Vec<NodeRecord> {
        let deleted: HashSet<&str> = self.deleted_ids.iter().map(String::as_str).collect();
        apply_updates(nodes, &deleted, &self.updates)
    }

    #[must_use]
    pub fn result(&self) -> DeleteResult {
        let mut affected_ids = self.deleted_ids.clone();
        affected_ids.extend(self.promoted_ids.iter().cloned());
        DeleteResult {
            deleted_count: self.deleted_ids.len(),
            affected_ids,
        }
    }
}

/// Plans deleting `node_id` with the given strategy.
///
/// Subtree collection is cycle-guarded, so a corrupted snapshot still yields
/// a finite plan.
///
/// # Errors
///
/// Returns [`TreeError::NodeNotFound`] if `node_id` is not in the snapshot.
pub fn plan_delete(
    nodes: &[NodeRecord],
    node_id: &str,
    strategy: DeleteStrategy,
    allocator: &OrderAllocator,
) -> Result<DeletePlan> {
    let index = SnapshotIndex::new(nodes);
    let target = index
        .handle(node_id)
        .ok_or_else(|| TreeError::NodeNotFound(node_id.to_string()))?;

    match strategy {
        DeleteStrategy::DeleteAll => {
            let mut deleted_ids = vec![node_id.to_string()];
            deleted_ids.extend(descendants_in(&index, node_id).iter().map(|n| n.id.clone()));
            log::debug!("planned delete of {node_id} with {} descendant(s)", deleted_ids.len() - 1);
            Ok(DeletePlan {
                strategy,
                deleted_ids,
                updates: Vec::new(),
                promoted_ids: Vec::new(),
            })
        }
        DeleteStrategy::PromoteChildren => {
            let record = index.get(target);
            let parent = index.parent_of(target);
            let new_parent = parent.map(|p| index.get(p).id.clone());
            let children = index.resolve(index.children_of(target));

            // Splice the children into the target's slot.
            let mut sequence = Vec::new();
            for sibling in group(&index, parent, &record.workspace) {
                if std::ptr::eq(sibling, record) {
                    sequence.extend(children.iter().map(|c| (*c, true)));
                } else {
                    sequence.push((sibling, false));
                }
            }

            let updates: Vec<OrderUpdate> = sequence
                .into_iter()
                .enumerate()
                .filter_map(|(slot, (node, promoted))| {
                    let order = allocator.slot_order(slot);
                    let parent = if promoted { new_parent.clone() } else { node.parent.clone() };
                    (promoted || node.order != order).then(|| OrderUpdate {
                        id: node.id.clone(),
                        parent,
                        order,
                    })
                })
                .collect();
            let promoted_ids: Vec<String> = children.iter().map(|c| c.id.clone()).collect();
            log::debug!(
                "planned delete of {node_id}, promoting {} child(ren) to {new_parent:?}",
                promoted_ids.len()
            );

            Ok(DeletePlan {
                strategy,
                deleted_ids: vec![node_id.to_string()],
                updates,
                promoted_ids,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{cyclic, file, folder, ids, sample};
    use crate::{child_nodes, root_nodes};

    #[test]
    fn test_delete_all_removes_subtree() {
        let nodes = sample();
        let plan = plan_delete(&nodes, "a", DeleteStrategy::DeleteAll, &OrderAllocator::default())
            .unwrap();
        assert_eq!(plan.deleted_ids, vec!["a", "a1", "a2"]);
        assert!(plan.updates.is_empty());

        let next = plan.apply(&nodes);
        assert_eq!(next.len(), 2);
        assert_eq!(ids(&child_nodes("r", &next)), vec!["b"]);

        let result = plan.result();
        assert_eq!(result.deleted_count, 3);
        assert_eq!(result.affected_ids.len(), 3);
    }

    #[test]
    fn test_promote_children_takes_the_deleted_slot() {
        let mut nodes = sample();
        nodes.push(file("c", Some("r"), 3.0));
        let alloc = OrderAllocator::default();
        let plan = plan_delete(&nodes, "a", DeleteStrategy::PromoteChildren, &alloc).unwrap();
        assert_eq!(plan.deleted_ids, vec!["a"]);
        assert_eq!(plan.promoted_ids, vec!["a1", "a2"]);

        let next = plan.apply(&nodes);
        assert_eq!(ids(&child_nodes("r", &next)), vec!["a1", "a2", "b", "c"]);
        let orders: Vec<f64> = child_nodes("r", &next).iter().map(|n| n.order).collect();
        assert_eq!(orders, vec![1.0, 2.0, 3.0, 4.0]);

        let result = plan.result();
        assert_eq!(result.deleted_count, 1);
        assert_eq!(result.affected_ids, vec!["a", "a1", "a2"]);
    }

    #[test]
    fn test_promote_root_children_to_root_level() {
        let nodes = vec![
            folder("top", None, 1.0),
            file("t1", Some("top"), 1.0),
            folder("other", None, 2.0),
        ];
        let alloc = OrderAllocator::default();
        let plan = plan_delete(&nodes, "top", DeleteStrategy::PromoteChildren, &alloc).unwrap();
        let next = plan.apply(&nodes);
        assert_eq!(ids(&root_nodes(&next, "ws")), vec!["t1", "other"]);
        assert_eq!(next.iter().find(|n| n.id == "t1").unwrap().parent, None);
    }

    #[test]
    fn test_delete_all_on_cycle_terminates() {
        let nodes = cyclic();
        let plan = plan_delete(&nodes, "x", DeleteStrategy::DeleteAll, &OrderAllocator::default())
            .unwrap();
        assert_eq!(plan.deleted_ids, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_delete_unknown_node() {
        let alloc = OrderAllocator::default();
        let err = plan_delete(&sample(), "ghost", DeleteStrategy::DeleteAll, &alloc).unwrap_err();
        assert!(matches!(err, TreeError::NodeNotFound(_)));
    }

    #[test]
    fn test_strategy_serialization() {
        let json = serde_json::to_string(&DeleteStrategy::DeleteAll).unwrap();
        assert_eq!(json, r#""DeleteAll""#);
        let parsed: DeleteStrategy = serde_json::from_str(r#""PromoteChildren""#).unwrap();
        assert_eq!(parsed, DeleteStrategy::PromoteChildren);
    }
}
