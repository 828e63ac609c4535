//! Read-only traversal and filter queries over a snapshot.
//!
//! Results borrow from the snapshot. Traversals share the root-level rules of
//! [`SnapshotIndex`]: unresolved and cross-workspace parents count as root
//! level, and every walk carries a visited set so a corrupted snapshot still
//! terminates.

use std::collections::{BTreeSet, HashSet};

use crate::core::snapshot::SnapshotIndex;
use crate::{NodeKind, NodeRecord, Result, TreeError};

/// Direct children of `node_id`, sorted by `(order, id)`.
///
/// An unknown `node_id` has no children.
#[must_use]
pub fn child_nodes<'a>(node_id: &str, nodes: &'a [NodeRecord]) -> Vec<&'a NodeRecord> {
    let index = SnapshotIndex::new(nodes);
    child_nodes_in(&index, node_id)
}

#[must_use]
pub fn child_nodes_in<'a>(index: &SnapshotIndex<'a>, node_id: &str) -> Vec<&'a NodeRecord> {
    index
        .handle(node_id)
        .map(|h| index.resolve(index.children_of(h)))
        .unwrap_or_default()
}

/// Every proper descendant of `node_id` in pre-order (parent before its
/// children, siblings by `(order, id)`).
///
/// `node_id` itself is never included, even when a corrupted snapshot loops
/// back to it.
#[must_use]
pub fn descendants<'a>(node_id: &str, nodes: &'a [NodeRecord]) -> Vec<&'a NodeRecord> {
    let index = SnapshotIndex::new(nodes);
    descendants_in(&index, node_id)
}

#[must_use]
pub fn descendants_in<'a>(index: &SnapshotIndex<'a>, node_id: &str) -> Vec<&'a NodeRecord> {
    let Some(start) = index.handle(node_id) else {
        return Vec::new();
    };
    let mut visited = HashSet::from([start]);
    let mut out = Vec::new();
    let mut stack: Vec<_> = index.children_of(start).iter().rev().copied().collect();
    while let Some(handle) = stack.pop() {
        if !visited.insert(handle) {
            continue;
        }
        out.push(index.get(handle));
        stack.extend(index.children_of(handle).iter().rev().copied());
    }
    out
}

/// Root-level nodes of `workspace`, sorted by `(order, id)`.
///
/// Includes nodes whose parent is missing from the snapshot.
#[must_use]
pub fn root_nodes<'a>(nodes: &'a [NodeRecord], workspace: &str) -> Vec<&'a NodeRecord> {
    let index = SnapshotIndex::new(nodes);
    root_nodes_in(&index, workspace)
}

#[must_use]
pub fn root_nodes_in<'a>(index: &SnapshotIndex<'a>, workspace: &str) -> Vec<&'a NodeRecord> {
    index
        .roots()
        .iter()
        .map(|&h| index.get(h))
        .filter(|n| n.workspace == workspace)
        .collect()
}

/// The chain `root -> ... -> node_id`, e.g. for breadcrumbs.
///
/// # Errors
///
/// Returns [`TreeError::NodeNotFound`] if `node_id` is not in the snapshot and
/// [`TreeError::CycleDetected`] if the parent walk revisits a node.
pub fn node_path<'a>(node_id: &str, nodes: &'a [NodeRecord]) -> Result<Vec<&'a NodeRecord>> {
    let index = SnapshotIndex::new(nodes);
    node_path_in(&index, node_id)
}

/// [`node_path`] against an already built index.
///
/// # Errors
///
/// See [`node_path`].
pub fn node_path_in<'a>(index: &SnapshotIndex<'a>, node_id: &str) -> Result<Vec<&'a NodeRecord>> {
    let start = index
        .handle(node_id)
        .ok_or_else(|| TreeError::NodeNotFound(node_id.to_string()))?;
    let mut visited = HashSet::new();
    let mut path = Vec::new();
    let mut current = Some(start);
    while let Some(handle) = current {
        if !visited.insert(handle) {
            return Err(TreeError::CycleDetected(index.get(handle).id.clone()));
        }
        path.push(index.get(handle));
        current = index.parent_of(handle);
    }
    path.reverse();
    Ok(path)
}

/// Nodes of the given kind, in input order.
#[must_use]
pub fn filter_by_type(nodes: &[NodeRecord], kind: NodeKind) -> Vec<&NodeRecord> {
    nodes.iter().filter(|n| n.kind == kind).collect()
}

/// Nodes carrying `tag`, in input order.
#[must_use]
pub fn filter_by_tag<'a>(nodes: &'a [NodeRecord], tag: &str) -> Vec<&'a NodeRecord> {
    nodes.iter().filter(|n| n.has_tag(tag)).collect()
}

/// Every tag used in the snapshot, sorted and deduplicated.
#[must_use]
pub fn all_tags(nodes: &[NodeRecord]) -> Vec<String> {
    nodes
        .iter()
        .flat_map(|n| n.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
