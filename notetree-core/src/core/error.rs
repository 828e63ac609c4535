//! Error types for the node tree engine.

use thiserror::Error;

/// All errors that can occur within the node tree engine.
#[derive(Debug, Error)]
pub enum TreeError {
    /// An operation would create, or walked into, an ancestor cycle.
    #[error("Cycle detected at node: {0}")]
    CycleDetected(String),

    /// A node was asked to take a parent that belongs to another workspace.
    #[error("Cross-workspace parent: node {node} cannot be placed under {parent}")]
    CrossWorkspaceParent { node: String, parent: String },

    /// A `parent` reference does not resolve to any node in the snapshot.
    ///
    /// Read paths tolerate this and treat the node as a root; it only surfaces
    /// as an error from [`HealthReport::into_result`](super::health::HealthReport::into_result).
    #[error("Unresolved parent {parent} for node {node}")]
    UnresolvedParent { node: String, parent: String },

    /// A node ID was requested that does not exist in the snapshot.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// A node kind string did not name any known [`NodeKind`](super::node::NodeKind).
    #[error("Invalid node kind: {0}")]
    InvalidNodeKind(String),

    /// An [`OrderConfig`](super::config::OrderConfig) value is out of range.
    #[error("Invalid order configuration: {0}")]
    InvalidConfig(String),

    /// Configuration JSON could not be deserialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias that pins the error type to [`TreeError`].
pub type Result<T> = std::result::Result<T, TreeError>;

impl TreeError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::CycleDetected(_) => {
                "Cannot move a node into one of its own descendants".to_string()
            }
            Self::CrossWorkspaceParent { .. } => {
                "Nodes cannot be moved between workspaces".to_string()
            }
            Self::UnresolvedParent { .. } => {
                "The file tree references a missing folder".to_string()
            }
            Self::NodeNotFound(_) => "Node no longer exists".to_string(),
            Self::InvalidNodeKind(kind) => format!("Unknown node type: {kind}"),
            Self::InvalidConfig(msg) => msg.clone(),
            Self::Json(e) => format!("Data format error: {e}"),
        }
    }

    /// Returns `true` for failures that must abort a structural write.
    ///
    /// `UnresolvedParent` is a data-quality issue and is not one of them.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::CycleDetected(_) | Self::CrossWorkspaceParent { .. }
        )
    }
}
