//! Forest construction from a flat snapshot.

use serde::Serialize;

use crate::core::node::sibling_cmp;
use crate::core::snapshot::{NodeHandle, SnapshotIndex};
use crate::NodeRecord;

/// A node of the derived forest. Borrows its record from the snapshot and is
/// discarded once the caller's read completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode<'a> {
    pub record: &'a NodeRecord,
    /// Distance from the forest's root level (roots are depth 0).
    pub depth: usize,
    pub children: Vec<TreeNode<'a>>,
}

impl TreeNode<'_> {
    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.record.id
    }
}

/// Total node count of a forest.
#[must_use]
pub fn forest_size(forest: &[TreeNode<'_>]) -> usize {
    forest.iter().map(TreeNode::size).sum()
}

/// Builds the full forest of `nodes`, siblings sorted by `(order, id)`.
///
/// Never fails and never drops a record: nodes with an unresolved or
/// cross-workspace parent become roots, and nodes trapped in a parent cycle
/// (unreachable from any root) are attached as extra roots after the regular
/// ones.
///
/// # Examples
///
/// ```rust
/// use notetree_core::{build_tree, NodeKind, NodeRecord};
///
/// let root = NodeRecord::new("ws", None, NodeKind::Folder, "Root", 1.0);
/// let child = NodeRecord::new("ws", Some(root.id.as_str()), NodeKind::File, "Child", 1.0);
/// let nodes = vec![child, root];
///
/// let forest = build_tree(&nodes);
/// assert_eq!(forest.len(), 1);
/// assert_eq!(forest[0].record.title, "Root");
/// assert_eq!(forest[0].children[0].depth, 1);
/// ```
#[must_use]
pub fn build_tree(nodes: &[NodeRecord]) -> Vec<TreeNode<'_>> {
    let index = SnapshotIndex::new(nodes);
    build_tree_in(&index)
}

/// [`build_tree`] against an already built index.
#[must_use]
pub fn build_tree_in<'a>(index: &SnapshotIndex<'a>) -> Vec<TreeNode<'a>> {
    let mut visited = vec![false; index.len()];
    let mut forest: Vec<TreeNode<'a>> = index
        .roots()
        .iter()
        .map(|&root| build_node(index, root, 0, &mut visited))
        .collect();

    let mut stranded: Vec<NodeHandle> = index
        .handles()
        .filter(|h| !visited[h.index()])
        .collect();
    if !stranded.is_empty() {
        log::warn!(
            "{} node(s) sit on a parent cycle; attaching them at root level",
            stranded.len()
        );
        stranded.sort_by(|a, b| sibling_cmp(index.get(*a), index.get(*b)));
        for handle in stranded {
            if !visited[handle.index()] {
                forest.push(build_node(index, handle, 0, &mut visited));
            }
        }
    }
    forest
}

/// Builds only the subtrees below `root_parent` (`None` builds the full forest).
///
/// An unknown `root_parent` yields an empty forest.
#[must_use]
pub fn build_tree_under<'a>(
    nodes: &'a [NodeRecord],
    root_parent: Option<&str>,
) -> Vec<TreeNode<'a>> {
    let index = SnapshotIndex::new(nodes);
    let Some(parent_id) = root_parent else {
        return build_tree_in(&index);
    };
    let Some(parent) = index.handle(parent_id) else {
        return Vec::new();
    };

    let mut visited = vec![false; index.len()];
    visited[parent.index()] = true;
    let mut forest = Vec::new();
    for &child in index.children_of(parent) {
        if !visited[child.index()] {
            forest.push(build_node(&index, child, 0, &mut visited));
        }
    }
    forest
}

fn build_node<'a>(
    index: &SnapshotIndex<'a>,
    handle: NodeHandle,
    depth: usize,
    visited: &mut [bool],
) -> TreeNode<'a> {
    visited[handle.index()] = true;
    let mut children = Vec::with_capacity(index.children_of(handle).len());
    for &child in index.children_of(handle) {
        if visited[child.index()] {
            continue;
        }
        children.push(build_node(index, child, depth + 1, visited));
    }
    TreeNode {
        record: index.get(handle),
        depth,
        children,
    }
}
