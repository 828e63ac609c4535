//! Structural mutation planning: create and move.
//!
//! A planner validates a proposed mutation against the current snapshot and
//! computes every `parent`/`order` write it implies. The persistence layer
//! then commits the plan in one transaction. Planners never touch storage.
//!
//! ## Serialization of writers
//!
//! A plan is only correct for the snapshot it was computed from. Two plans
//! computed from the same snapshot for the same sibling group can collide,
//! so callers must serialize plan-and-commit per workspace and always plan
//! against the latest committed snapshot.

use std::collections::{HashMap, HashSet};

use crate::core::cycle::check_reparent_in;
use crate::core::node::sibling_cmp;
use crate::core::query::root_nodes_in;
use crate::core::snapshot::{NodeHandle, SnapshotIndex};
use crate::{InsertPlan, NodeKind, NodeRecord, OrderAllocator, Result, TreeError};

/// Controls where a new node is placed relative to the selected node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddPosition {
    /// Append as the last child of the selected node (root level when nothing is selected).
    AsChild,
    /// Insert immediately after the selected node within the same parent.
    AsSibling,
}

/// One `parent`/`order` write for an existing node.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderUpdate {
    pub id: String,
    pub parent: Option<String>,
    pub order: f64,
}

/// A validated node creation.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePlan {
    /// The record to insert, with its parent and order filled in.
    pub record: NodeRecord,
    /// Writes to existing siblings (non-empty only after renumbering).
    pub updates: Vec<OrderUpdate>,
}

impl CreatePlan {
    /// Returns a new snapshot with the plan committed.
    #[must_use]
    pub fn apply(&self, nodes: &[NodeRecord]) -> Vec<NodeRecord> {
        let mut next = apply_updates(nodes, &HashSet::new(), &self.updates);
        next.push(self.record.clone());
        next
    }
}

/// A validated reparent and/or reorder.
#[derive(Debug, Clone, PartialEq)]
pub struct MovePlan {
    pub node_id: String,
    pub old_parent: Option<String>,
    pub new_parent: Option<String>,
    pub order: f64,
    /// Writes for the moved node followed by any renumbered siblings.
    pub updates: Vec<OrderUpdate>,
}

impl MovePlan {
    /// Returns a new snapshot with the plan committed.
    #[must_use]
    pub fn apply(&self, nodes: &[NodeRecord]) -> Vec<NodeRecord> {
        apply_updates(nodes, &HashSet::new(), &self.updates)
    }
}

/// Plans the creation of a `kind` node titled `title` in `workspace`.
///
/// # Errors
///
/// Returns [`TreeError::NodeNotFound`] if `selected` is not in the snapshot and
/// [`TreeError::CrossWorkspaceParent`] if it belongs to another workspace.
pub fn plan_create(
    nodes: &[NodeRecord],
    workspace: &str,
    selected: Option<&str>,
    position: AddPosition,
    kind: NodeKind,
    title: &str,
    allocator: &OrderAllocator,
) -> Result<CreatePlan> {
    let index = SnapshotIndex::new(nodes);
    let mut record = NodeRecord::new(workspace, None, kind, title, 0.0);

    let selected = match selected {
        Some(id) => {
            let handle = index
                .handle(id)
                .ok_or_else(|| TreeError::NodeNotFound(id.to_string()))?;
            if index.get(handle).workspace != workspace {
                return Err(TreeError::CrossWorkspaceParent {
                    node: record.id.clone(),
                    parent: id.to_string(),
                });
            }
            Some(handle)
        }
        None => None,
    };

    let (parent, plan) = match (position, selected) {
        (AddPosition::AsChild, parent) => {
            let siblings = group(&index, parent, workspace);
            (parent, allocator.append(&siblings))
        }
        (AddPosition::AsSibling, Some(anchor)) => {
            let parent = index.parent_of(anchor);
            let siblings = group(&index, parent, workspace);
            let at = siblings
                .iter()
                .position(|n| std::ptr::eq(*n, index.get(anchor)))
                .map_or(siblings.len(), |i| i + 1);
            (parent, allocator.insert_at(&siblings, at))
        }
        (AddPosition::AsSibling, None) => {
            let siblings = group(&index, None, workspace);
            (None, allocator.append(&siblings))
        }
    };

    record.parent = parent.map(|p| index.get(p).id.clone());
    record.order = plan.order;
    let updates = renumber_updates(&index, &plan);
    log::debug!(
        "planned create of {} under {:?} at order {}",
        record.id,
        record.parent,
        record.order
    );
    Ok(CreatePlan { record, updates })
}

/// Plans moving `node_id` under `new_parent` (root level for `None`).
///
/// `index` is the position among the new siblings, excluding the moved node
/// itself; `None` appends at the end.
///
/// # Errors
///
/// Returns [`TreeError::NodeNotFound`], [`TreeError::CrossWorkspaceParent`] or
/// [`TreeError::CycleDetected`] as reported by
/// [`check_reparent`](crate::check_reparent). The caller must abort the write.
///
/// # Examples
///
/// ```rust
/// use notetree_core::{build_tree, plan_move, NodeKind, NodeRecord, OrderAllocator};
///
/// let a = NodeRecord::new("ws", None, NodeKind::Folder, "A", 1.0);
/// let b = NodeRecord::new("ws", None, NodeKind::Folder, "B", 2.0);
/// let nodes = vec![a.clone(), b.clone()];
///
/// let alloc = OrderAllocator::default();
/// let plan = plan_move(&nodes, &b.id, Some(a.id.as_str()), None, &alloc).unwrap();
/// let moved = plan.apply(&nodes);
/// assert_eq!(build_tree(&moved)[0].children[0].record.id, b.id);
///
/// assert!(plan_move(&nodes, &a.id, Some(a.id.as_str()), None, &alloc).is_err());
/// ```
pub fn plan_move(
    nodes: &[NodeRecord],
    node_id: &str,
    new_parent: Option<&str>,
    index: Option<usize>,
    allocator: &OrderAllocator,
) -> Result<MovePlan> {
    let snapshot = SnapshotIndex::new(nodes);
    check_reparent_in(&snapshot, node_id, new_parent)?;

    // Both lookups are guaranteed by check_reparent_in.
    let node = snapshot
        .handle(node_id)
        .ok_or_else(|| TreeError::NodeNotFound(node_id.to_string()))?;
    let parent = new_parent.and_then(|id| snapshot.handle(id));
    let record = snapshot.get(node);

    let siblings: Vec<&NodeRecord> = group(&snapshot, parent, &record.workspace)
        .into_iter()
        .filter(|n| !std::ptr::eq(*n, record))
        .collect();
    let plan = match index {
        Some(at) => allocator.insert_at(&siblings, at),
        None => allocator.append(&siblings),
    };

    let mut updates = vec![OrderUpdate {
        id: node_id.to_string(),
        parent: new_parent.map(str::to_string),
        order: plan.order,
    }];
    updates.extend(renumber_updates(&snapshot, &plan));
    log::debug!(
        "planned move of {node_id} from {:?} to {new_parent:?} at order {}",
        record.parent,
        plan.order
    );

    Ok(MovePlan {
        node_id: node_id.to_string(),
        old_parent: record.parent.clone(),
        new_parent: new_parent.map(str::to_string),
        order: plan.order,
        updates,
    })
}

/// The sibling group under `parent`, or the root level of `workspace`.
pub(crate) fn group<'a>(
    index: &SnapshotIndex<'a>,
    parent: Option<NodeHandle>,
    workspace: &str,
) -> Vec<&'a NodeRecord> {
    match parent {
        Some(p) => index.resolve(index.children_of(p)),
        None => root_nodes_in(index, workspace),
    }
}

/// Turns a renumbering map into writes, in sibling order so plans are deterministic.
fn renumber_updates(index: &SnapshotIndex<'_>, plan: &InsertPlan) -> Vec<OrderUpdate> {
    let mut records: Vec<&NodeRecord> = plan
        .renumbered
        .keys()
        .filter_map(|id| index.handle(id).map(|h| index.get(h)))
        .collect();
    records.sort_by(|a, b| sibling_cmp(a, b));
    records
        .into_iter()
        .map(|n| OrderUpdate {
            id: n.id.clone(),
            parent: n.parent.clone(),
            order: plan.renumbered[&n.id],
        })
        .collect()
}

/// Copies `nodes` minus `deleted`, with `updates` applied by id.
pub(crate) fn apply_updates(
    nodes: &[NodeRecord],
    deleted: &HashSet<&str>,
    updates: &[OrderUpdate],
) -> Vec<NodeRecord> {
    let by_id: HashMap<&str, &OrderUpdate> = updates.iter().map(|u| (u.id.as_str(), u)).collect();
    nodes
        .iter()
        .filter(|n| !deleted.contains(n.id.as_str()))
        .map(|n| {
            let mut next = n.clone();
            if let Some(update) = by_id.get(n.id.as_str()) {
                next.parent = update.parent.clone();
                next.order = update.order;
            }
            next
        })
        .collect()
}
