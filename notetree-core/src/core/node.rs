//! The node record every other engine component reads from.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::TreeError;

/// The kind of entry a node represents in the file tree.
///
/// Serialized in lower case (`"folder"`, `"file"`, ...) to match the values
/// stored by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    #[default]
    File,
    Canvas,
    Diary,
    Drawing,
}

impl NodeKind {
    /// Whether the UI lets this kind hold children. The engine itself does not enforce it.
    #[must_use]
    pub fn can_have_children(self) -> bool {
        matches!(self, Self::Folder)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
            Self::Canvas => "canvas",
            Self::Diary => "diary",
            Self::Drawing => "drawing",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "folder" => Ok(Self::Folder),
            "file" => Ok(Self::File),
            "canvas" => Ok(Self::Canvas),
            "diary" => Ok(Self::Diary),
            "drawing" => Ok(Self::Drawing),
            _ => Err(TreeError::InvalidNodeKind(s.to_string())),
        }
    }
}

/// One entry of a workspace snapshot, owned by the persistence layer.
///
/// # Examples
///
/// ```rust
/// use notetree_core::{NodeKind, NodeRecord};
///
/// let folder = NodeRecord::new("ws-1", None, NodeKind::Folder, "Projects", 1.0);
/// let json = serde_json::to_string(&folder).unwrap();
/// assert!(json.contains(r#""type":"folder""#));
/// assert!(json.contains("createdAt"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,
    pub workspace: String,
    pub parent: Option<String>,
    pub order: f64,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default = "default_collapsed")]
    pub collapsed: bool,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub modified_at: i64,
}

fn default_collapsed() -> bool {
    true
}

impl NodeRecord {
    /// Creates a record with a fresh UUID, collapsed, untagged and timestamped now.
    pub fn new(
        workspace: impl Into<String>,
        parent: Option<&str>,
        kind: NodeKind,
        title: impl Into<String>,
        order: f64,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            workspace: workspace.into(),
            parent: parent.map(str::to_string),
            order,
            kind,
            title: title.into(),
            tags: BTreeSet::new(),
            collapsed: true,
            created_at: now,
            modified_at: now,
        }
    }

    /// Returns `true` when the record carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

impl AsRef<NodeRecord> for NodeRecord {
    fn as_ref(&self) -> &NodeRecord {
        self
    }
}

/// Total sibling ordering: `order` first, then `id` for determinism.
///
/// `f64::total_cmp` keeps the ordering total even for `NaN` orders.
pub fn sibling_cmp(a: &NodeRecord, b: &NodeRecord) -> Ordering {
    a.order.total_cmp(&b.order).then_with(|| a.id.cmp(&b.id))
}
