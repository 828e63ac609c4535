//! Arena index over a caller-supplied snapshot.
//!
//! Every query in the engine starts by indexing the flat `&[NodeRecord]`
//! slice once: ids are mapped to [`NodeHandle`]s (positions in the slice),
//! and a `parent -> children` table is built in a single pass and sorted by
//! `(order, id)`. After that, traversals follow integer handles instead of
//! rescanning the slice.
//!
//! ## Referential gaps
//!
//! A record whose `parent` does not resolve, or resolves to a node in a
//! different workspace, is placed at root level for traversal. The index
//! keeps a list of such records so callers can log them; it never drops a
//! record.

use std::collections::HashMap;

use crate::core::node::sibling_cmp;
use crate::NodeRecord;

/// Position of a record inside the snapshot slice it was indexed from.
///
/// Handles are only meaningful for the [`SnapshotIndex`] that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(usize);

impl NodeHandle {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Read-only arena view of a snapshot. Borrows the records; never copies them.
#[derive(Debug)]
pub struct SnapshotIndex<'a> {
    nodes: &'a [NodeRecord],
    by_id: HashMap<&'a str, NodeHandle>,
    /// Parent link as stored, resolved to a handle when the id exists.
    linked: Vec<Option<NodeHandle>>,
    /// Parent used for traversal: `linked`, minus cross-workspace links.
    parents: Vec<Option<NodeHandle>>,
    children: Vec<Vec<NodeHandle>>,
    roots: Vec<NodeHandle>,
    unresolved: Vec<NodeHandle>,
    cross_workspace: Vec<NodeHandle>,
    duplicates: Vec<NodeHandle>,
}

impl<'a> SnapshotIndex<'a> {
    /// Indexes `nodes` in O(n), plus the per-group sort.
    pub fn new(nodes: &'a [NodeRecord]) -> Self {
        let mut by_id = HashMap::with_capacity(nodes.len());
        let mut duplicates = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            if by_id.contains_key(node.id.as_str()) {
                log::warn!("duplicate node id {} at snapshot position {i}", node.id);
                duplicates.push(NodeHandle(i));
            } else {
                by_id.insert(node.id.as_str(), NodeHandle(i));
            }
        }

        let mut linked = Vec::with_capacity(nodes.len());
        let mut parents = Vec::with_capacity(nodes.len());
        let mut children = vec![Vec::new(); nodes.len()];
        let mut roots = Vec::new();
        let mut unresolved = Vec::new();
        let mut cross_workspace = Vec::new();

        for (i, node) in nodes.iter().enumerate() {
            let handle = NodeHandle(i);
            let link = node
                .parent
                .as_deref()
                .and_then(|pid| by_id.get(pid).copied());
            linked.push(link);

            let parent = match (&node.parent, link) {
                (None, _) => None,
                (Some(pid), None) => {
                    log::warn!("node {} has unresolved parent {pid}", node.id);
                    unresolved.push(handle);
                    None
                }
                (Some(pid), Some(p)) if nodes[p.0].workspace != node.workspace => {
                    log::warn!(
                        "node {} in workspace {} references parent {pid} in workspace {}",
                        node.id,
                        node.workspace,
                        nodes[p.0].workspace
                    );
                    cross_workspace.push(handle);
                    None
                }
                (Some(_), Some(p)) => Some(p),
            };
            parents.push(parent);
            match parent {
                Some(p) => children[p.0].push(handle),
                None => roots.push(handle),
            }
        }

        let by_order = |a: &NodeHandle, b: &NodeHandle| sibling_cmp(&nodes[a.0], &nodes[b.0]);
        for group in &mut children {
            group.sort_by(by_order);
        }
        roots.sort_by(by_order);

        Self {
            nodes,
            by_id,
            linked,
            parents,
            children,
            roots,
            unresolved,
            cross_workspace,
            duplicates,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The snapshot this index was built from.
    #[must_use]
    pub fn records(&self) -> &'a [NodeRecord] {
        self.nodes
    }

    /// Every handle in snapshot order.
    pub fn handles(&self) -> impl Iterator<Item = NodeHandle> {
        (0..self.nodes.len()).map(NodeHandle)
    }

    #[must_use]
    pub fn get(&self, handle: NodeHandle) -> &'a NodeRecord {
        &self.nodes[handle.0]
    }

    /// Looks up the handle for `id`. With duplicate ids, the first record wins.
    #[must_use]
    pub fn handle(&self, id: &str) -> Option<NodeHandle> {
        self.by_id.get(id).copied()
    }

    /// Traversal parent of `handle`; `None` at root level, including
    /// unresolved and cross-workspace parents.
    #[must_use]
    pub fn parent_of(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.parents[handle.0]
    }

    /// The stored parent link resolved to a handle, ignoring workspaces.
    #[must_use]
    pub fn linked_parent_of(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.linked[handle.0]
    }

    /// Direct children of `handle`, sorted by `(order, id)`.
    #[must_use]
    pub fn children_of(&self, handle: NodeHandle) -> &[NodeHandle] {
        &self.children[handle.0]
    }

    /// Root-level handles, sorted by `(order, id)`.
    #[must_use]
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    /// Records whose parent id does not exist in the snapshot.
    #[must_use]
    pub fn unresolved(&self) -> Vec<&'a NodeRecord> {
        self.unresolved.iter().map(|&h| self.get(h)).collect()
    }

    /// Records whose parent lives in a different workspace.
    #[must_use]
    pub fn cross_workspace(&self) -> Vec<&'a NodeRecord> {
        self.cross_workspace.iter().map(|&h| self.get(h)).collect()
    }

    /// Records that repeat an id already seen earlier in the snapshot.
    #[must_use]
    pub fn duplicates(&self) -> Vec<&'a NodeRecord> {
        self.duplicates.iter().map(|&h| self.get(h)).collect()
    }

    /// Maps handles back to the records they point at.
    pub fn resolve(&self, handles: &[NodeHandle]) -> Vec<&'a NodeRecord> {
        handles.iter().map(|&h| self.get(h)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{capture_logs, file, folder, ids, sample};

    #[test]
    fn test_children_are_sorted_by_order_then_id() {
        let nodes = vec![
            folder("r", None, 1.0),
            file("c", Some("r"), 2.0),
            file("b", Some("r"), 1.0),
            file("a", Some("r"), 2.0),
        ];
        let index = SnapshotIndex::new(&nodes);
        let r = index.handle("r").unwrap();
        assert_eq!(ids(&index.resolve(index.children_of(r))), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_unresolved_parent_becomes_root() {
        let mut nodes = sample();
        nodes.push(file("orphan", Some("ghost"), 0.5));
        let index = SnapshotIndex::new(&nodes);
        assert_eq!(ids(&index.resolve(index.roots())), vec!["orphan", "r"]);
        assert_eq!(ids(&index.unresolved()), vec!["orphan"]);
        let orphan = index.handle("orphan").unwrap();
        assert_eq!(index.parent_of(orphan), None);
    }

    #[test]
    fn test_cross_workspace_parent_becomes_root() {
        let mut nodes = sample();
        let mut stray = file("stray", Some("a"), 1.0);
        stray.workspace = "other".to_string();
        nodes.push(stray);
        let index = SnapshotIndex::new(&nodes);
        let stray = index.handle("stray").unwrap();
        assert_eq!(index.parent_of(stray), None);
        assert_eq!(index.linked_parent_of(stray), index.handle("a"));
        assert_eq!(ids(&index.cross_workspace()), vec!["stray"]);
    }

    #[test]
    fn test_duplicate_ids_keep_first_record() {
        let mut nodes = sample();
        nodes.push(file("b", None, 9.0));
        let index = SnapshotIndex::new(&nodes);
        assert_eq!(index.handle("b").map(NodeHandle::index), Some(2));
        assert_eq!(index.duplicates().len(), 1);
        assert_eq!(index.len(), 6);
    }

    #[test]
    fn test_referential_gaps_are_logged_as_warnings() {
        let mut nodes = sample();
        nodes.push(file("orphan", Some("ghost"), 1.0));
        let mut stray = file("stray", Some("a"), 1.0);
        stray.workspace = "other".to_string();
        nodes.push(stray);
        nodes.push(file("b", None, 9.0));

        let logs = capture_logs(|| {
            let _ = SnapshotIndex::new(&nodes);
        });
        let warnings: Vec<&str> = logs
            .iter()
            .filter(|(level, _)| *level == log::Level::Warn)
            .map(|(_, line)| line.as_str())
            .collect();
        assert_eq!(warnings.len(), 3, "{logs:?}");
        assert!(warnings.iter().any(|w| w.contains("duplicate node id b")));
        assert!(warnings.iter().any(|w| w.contains("unresolved parent ghost")));
        assert!(warnings.iter().any(|w| w.contains("stray")));
    }
}
