//! Structural health check for a snapshot.
//!
//! Detects every invariant violation the engine tolerates on read paths so
//! the caller can surface it for inspection. Nothing is repaired here.

use std::collections::HashSet;

use crate::core::snapshot::{NodeHandle, SnapshotIndex};
use crate::{NodeRecord, Result, TreeError};

/// Invariant violations found in a snapshot. Every list holds node ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthReport {
    /// Ids that appear more than once.
    pub duplicate_ids: Vec<String>,
    /// `(node, parent)` pairs whose parent id is missing.
    pub unresolved_parents: Vec<(String, String)>,
    /// `(node, parent)` pairs whose parent lives in another workspace.
    pub cross_workspace_parents: Vec<(String, String)>,
    /// Nodes that lie on a parent cycle, in snapshot order.
    pub cycle_members: Vec<String>,
}

impl HealthReport {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.duplicate_ids.is_empty()
            && self.unresolved_parents.is_empty()
            && self.cross_workspace_parents.is_empty()
            && self.cycle_members.is_empty()
    }

    /// Surfaces the most severe violation as an error.
    ///
    /// Cycles are reported first, then cross-workspace parents, then
    /// unresolved parents. Duplicate ids are reported only through the list.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::CycleDetected`], [`TreeError::CrossWorkspaceParent`]
    /// or [`TreeError::UnresolvedParent`] for the first violation found.
    pub fn into_result(self) -> Result<()> {
        if let Some(id) = self.cycle_members.into_iter().next() {
            return Err(TreeError::CycleDetected(id));
        }
        if let Some((node, parent)) = self.cross_workspace_parents.into_iter().next() {
            return Err(TreeError::CrossWorkspaceParent { node, parent });
        }
        if let Some((node, parent)) = self.unresolved_parents.into_iter().next() {
            return Err(TreeError::UnresolvedParent { node, parent });
        }
        Ok(())
    }
}

/// Checks `nodes` against the structural invariants.
///
/// # Examples
///
/// ```rust
/// use notetree_core::{check_health, NodeKind, NodeRecord};
///
/// let mut a = NodeRecord::new("ws", None, NodeKind::Folder, "A", 1.0);
/// a.parent = Some(a.id.clone());
/// let report = check_health(&[a.clone()]);
/// assert_eq!(report.cycle_members, vec![a.id]);
/// assert!(report.into_result().is_err());
/// ```
#[must_use]
pub fn check_health(nodes: &[NodeRecord]) -> HealthReport {
    let index = SnapshotIndex::new(nodes);
    let pair = |n: &NodeRecord| (n.id.clone(), n.parent.clone().unwrap_or_default());

    let report = HealthReport {
        duplicate_ids: index.duplicates().iter().map(|n| n.id.clone()).collect(),
        unresolved_parents: index.unresolved().into_iter().map(pair).collect(),
        cross_workspace_parents: index.cross_workspace().into_iter().map(pair).collect(),
        cycle_members: cycle_members(&index),
    };
    if !report.is_healthy() {
        log::warn!(
            "snapshot health: {} duplicate id(s), {} unresolved parent(s), {} cross-workspace parent(s), {} node(s) on cycles",
            report.duplicate_ids.len(),
            report.unresolved_parents.len(),
            report.cross_workspace_parents.len(),
            report.cycle_members.len()
        );
    }
    report
}

/// Colours each node while following stored parent links; a walk that meets
/// a node from its own walk has found a cycle. Every node is walked at most
/// once overall, so this is O(n).
fn cycle_members(index: &SnapshotIndex<'_>) -> Vec<String> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Unseen,
        OnWalk(usize),
        Done,
    }

    let mut state = vec![State::Unseen; index.len()];
    let mut on_cycle: HashSet<NodeHandle> = HashSet::new();

    for (walk_id, start) in index.handles().enumerate() {
        let mut path = Vec::new();
        let mut current = Some(start);
        while let Some(handle) = current {
            match state[handle.index()] {
                State::Done => break,
                State::OnWalk(id) if id == walk_id => {
                    let from = path.iter().position(|&h| h == handle).unwrap_or(0);
                    on_cycle.extend(path[from..].iter().copied());
                    break;
                }
                State::OnWalk(_) => break,
                State::Unseen => {
                    state[handle.index()] = State::OnWalk(walk_id);
                    path.push(handle);
                    current = index.linked_parent_of(handle);
                }
            }
        }
        for handle in path {
            state[handle.index()] = State::Done;
        }
    }

    index
        .handles()
        .filter(|h| on_cycle.contains(h))
        .map(|h| index.get(h).id.clone())
        .collect()
}
