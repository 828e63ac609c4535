//! Node tree engine for a workspace-scoped note and file hierarchy.
//!
//! The engine is a pure computation layer over a caller-supplied snapshot of
//! [`NodeRecord`]s: it builds the file-tree forest, answers traversal queries,
//! guards reparent operations against ancestor cycles, and allocates sibling
//! orders. It never persists, caches or mutates anything; every function takes
//! the snapshot by reference and returns a fresh value.
//!
//! Structural writes follow *read snapshot → plan → commit*. The planners
//! ([`plan_create`], [`plan_move`], [`plan_delete`]) validate and compute the
//! writes; the persistence layer commits them and must serialize those
//! read-modify-write sequences per workspace.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use crate::core::{
    config::{OrderConfig, OrderPrecision},
    cycle::{check_reparent, check_reparent_in, would_create_cycle, would_create_cycle_in},
    delete::{plan_delete, DeletePlan, DeleteResult, DeleteStrategy},
    error::{Result, TreeError},
    health::{check_health, HealthReport},
    node::{sibling_cmp, NodeKind, NodeRecord},
    order::{InsertPlan, OrderAllocator},
    plan::{plan_create, plan_move, AddPosition, CreatePlan, MovePlan, OrderUpdate},
    query::{
        all_tags, child_nodes, child_nodes_in, descendants, descendants_in, filter_by_tag,
        filter_by_type, node_path, node_path_in, root_nodes, root_nodes_in,
    },
    snapshot::{NodeHandle, SnapshotIndex},
    tree::{build_tree, build_tree_in, build_tree_under, forest_size, TreeNode},
};
