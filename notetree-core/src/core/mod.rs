//! Internal domain modules for the node tree engine.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod config;
pub mod cycle;
pub mod delete;
pub mod error;
pub mod health;
pub mod node;
pub mod order;
pub mod plan;
pub mod query;
pub mod snapshot;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_support;

#[doc(inline)]
pub use config::{OrderConfig, OrderPrecision};
#[doc(inline)]
pub use delete::{DeletePlan, DeleteResult, DeleteStrategy};
#[doc(inline)]
pub use error::{Result, TreeError};
#[doc(inline)]
pub use health::HealthReport;
#[doc(inline)]
pub use node::{NodeKind, NodeRecord};
#[doc(inline)]
pub use order::{InsertPlan, OrderAllocator};
#[doc(inline)]
pub use plan::{AddPosition, CreatePlan, MovePlan, OrderUpdate};
#[doc(inline)]
pub use snapshot::{NodeHandle, SnapshotIndex};
#[doc(inline)]
pub use tree::TreeNode;
