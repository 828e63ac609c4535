//! Ancestor-cycle detection for proposed reparent operations.

use std::collections::HashSet;

use crate::core::snapshot::{NodeHandle, SnapshotIndex};
use crate::{NodeRecord, Result, TreeError};

/// Returns `true` if setting `node_id.parent = proposed_parent` would make
/// `node_id` its own ancestor.
///
/// Moving to root level (`None`) never creates a cycle. The ancestor chain of
/// the proposed parent is walked with a visited set, so a snapshot that
/// already contains an unrelated cycle still terminates; that case returns
/// `true` as well, since the move cannot be proven safe.
///
/// # Examples
///
/// ```rust
/// use notetree_core::{would_create_cycle, NodeKind, NodeRecord};
///
/// let a = NodeRecord::new("ws", None, NodeKind::Folder, "A", 1.0);
/// let b = NodeRecord::new("ws", Some(a.id.as_str()), NodeKind::Folder, "B", 1.0);
/// let nodes = vec![a.clone(), b.clone()];
///
/// assert!(would_create_cycle(&a.id, Some(b.id.as_str()), &nodes));
/// assert!(!would_create_cycle(&b.id, None, &nodes));
/// ```
#[must_use]
pub fn would_create_cycle(
    node_id: &str,
    proposed_parent: Option<&str>,
    nodes: &[NodeRecord],
) -> bool {
    let index = SnapshotIndex::new(nodes);
    would_create_cycle_in(&index, node_id, proposed_parent)
}

/// [`would_create_cycle`] against an already built index.
#[must_use]
pub fn would_create_cycle_in(
    index: &SnapshotIndex<'_>,
    node_id: &str,
    proposed_parent: Option<&str>,
) -> bool {
    let Some(parent_id) = proposed_parent else {
        return false;
    };
    if parent_id == node_id {
        return true;
    }
    let Some(start) = index.handle(parent_id) else {
        // A parent outside the snapshot has no ancestors we can see.
        return false;
    };
    match walk_ancestors(index, start, node_id) {
        Walk::Root => false,
        Walk::FoundTarget => true,
        Walk::Revisited(at) => {
            log::warn!(
                "snapshot already contains a parent cycle through {}; rejecting reparent of {node_id}",
                index.get(at).id
            );
            true
        }
    }
}

/// Validates a proposed reparent and explains why it is rejected.
///
/// Checks run in order: both nodes exist, the parent is in the same
/// workspace, and the move does not create a cycle.
///
/// # Errors
///
/// Returns [`TreeError::NodeNotFound`] if either id is missing,
/// [`TreeError::CrossWorkspaceParent`] if the parent belongs to another
/// workspace, and [`TreeError::CycleDetected`] if [`would_create_cycle`]
/// would return `true`.
pub fn check_reparent(
    node_id: &str,
    proposed_parent: Option<&str>,
    nodes: &[NodeRecord],
) -> Result<()> {
    let index = SnapshotIndex::new(nodes);
    check_reparent_in(&index, node_id, proposed_parent)
}

/// [`check_reparent`] against an already built index.
///
/// # Errors
///
/// See [`check_reparent`].
pub fn check_reparent_in(
    index: &SnapshotIndex<'_>,
    node_id: &str,
    proposed_parent: Option<&str>,
) -> Result<()> {
    let node = index
        .handle(node_id)
        .ok_or_else(|| TreeError::NodeNotFound(node_id.to_string()))?;
    let Some(parent_id) = proposed_parent else {
        return Ok(());
    };
    let parent = index
        .handle(parent_id)
        .ok_or_else(|| TreeError::NodeNotFound(parent_id.to_string()))?;

    if index.get(parent).workspace != index.get(node).workspace {
        return Err(TreeError::CrossWorkspaceParent {
            node: node_id.to_string(),
            parent: parent_id.to_string(),
        });
    }
    if would_create_cycle_in(index, node_id, proposed_parent) {
        return Err(TreeError::CycleDetected(node_id.to_string()));
    }
    Ok(())
}

enum Walk {
    Root,
    FoundTarget,
    Revisited(NodeHandle),
}

/// Follows stored parent links upward from `start`. The visited set bounds
/// the walk at `index.len()` steps.
fn walk_ancestors(index: &SnapshotIndex<'_>, start: NodeHandle, target: &str) -> Walk {
    let mut visited = HashSet::with_capacity(index.len().min(64));
    let mut current = Some(start);
    while let Some(handle) = current {
        if index.get(handle).id == target {
            return Walk::FoundTarget;
        }
        if !visited.insert(handle) {
            return Walk::Revisited(handle);
        }
        current = index.linked_parent_of(handle);
    }
    Walk::Root
}
