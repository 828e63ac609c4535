//! Sibling order allocation: append, insert-between and renormalization.
//!
//! Orders are plain `f64` keys compared together with the node id (see
//! [`sibling_cmp`]). Inserting between two neighbours takes their midpoint;
//! when the configured [`OrderPrecision`] cannot represent a value strictly
//! between them, the whole sibling group is renumbered.
//!
//! ## Guarantee
//!
//! After [`OrderAllocator::insert_at`], the new order lies strictly between
//! the intended neighbours' (possibly renumbered) orders, and the relative
//! order of existing siblings is unchanged.

use std::collections::HashMap;

use crate::core::node::sibling_cmp;
use crate::{NodeRecord, OrderConfig, OrderPrecision, Result};

/// The outcome of an insert: the order for the new node, plus any sibling
/// orders that must be written in the same transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertPlan {
    pub order: f64,
    /// Sibling id to new order. Empty when no sibling moves.
    pub renumbered: HashMap<String, f64>,
}

impl InsertPlan {
    pub(crate) fn at(order: f64) -> Self {
        Self {
            order,
            renumbered: HashMap::new(),
        }
    }
}

/// Computes order values under an [`OrderConfig`].
///
/// # Examples
///
/// ```rust
/// use notetree_core::OrderAllocator;
///
/// let alloc = OrderAllocator::default();
/// assert_eq!(alloc.calculate_insert_order(Some(2.0), Some(6.0)), 4.0);
/// assert!(alloc.needs_renormalization(Some(1.0), Some(2.0)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrderAllocator {
    config: OrderConfig,
}

impl OrderAllocator {
    /// # Errors
    ///
    /// Returns [`crate::TreeError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: OrderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &OrderConfig {
        &self.config
    }

    /// Order for appending after every sibling: `max + spacing`, or `start`
    /// for an empty group.
    #[must_use]
    pub fn next_order<S: AsRef<NodeRecord>>(&self, siblings: &[S]) -> f64 {
        let max = siblings
            .iter()
            .map(|n| n.as_ref().order)
            .fold(f64::NEG_INFINITY, f64::max);
        if max == f64::NEG_INFINITY {
            return self.config.start;
        }
        self.snap_down(max + self.config.spacing)
    }

    /// Order for a node placed between `before` and `after`.
    ///
    /// With both bounds this is the midpoint; callers must check
    /// [`needs_renormalization`](Self::needs_renormalization) first, since the
    /// midpoint of adjacent bounds is not representable.
    #[must_use]
    pub fn calculate_insert_order(&self, before: Option<f64>, after: Option<f64>) -> f64 {
        let spacing = self.config.spacing;
        match (before, after) {
            (Some(lo), Some(hi)) => {
                let mid = lo + (hi - lo) / 2.0;
                match self.config.precision {
                    OrderPrecision::Float { .. } => mid,
                    OrderPrecision::Integer => [mid.floor(), mid.ceil()]
                        .into_iter()
                        .find(|&c| c > lo && c < hi)
                        .unwrap_or(mid),
                }
            }
            (None, Some(hi)) => self.snap_up(hi - spacing),
            (Some(lo), None) => self.snap_down(lo + spacing),
            (None, None) => self.config.start,
        }
    }

    /// Whether no order strictly between `before` and `after` is
    /// representable, so the group must be renumbered first.
    ///
    /// Ties (`before >= after`) always need renumbering; a one-sided or empty
    /// range never does.
    #[must_use]
    pub fn needs_renormalization(&self, before: Option<f64>, after: Option<f64>) -> bool {
        let (Some(lo), Some(hi)) = (before, after) else {
            return false;
        };
        // Negated so NaN bounds also land here.
        if !(lo < hi) {
            return true;
        }
        match self.config.precision {
            // Large values lose whole-number resolution, so test the
            // candidates themselves rather than the width of the gap.
            OrderPrecision::Integer => {
                let mid = lo + (hi - lo) / 2.0;
                ![mid.floor(), mid.ceil()].into_iter().any(|c| c > lo && c < hi)
            }
            OrderPrecision::Float { min_gap } => {
                let mid = lo + (hi - lo) / 2.0;
                hi - lo < min_gap || mid <= lo || mid >= hi
            }
        }
    }

    /// Evenly spaced orders (`start`, `start + spacing`, ...) for every
    /// sibling, keeping their current `(order, id)` sequence.
    #[must_use]
    pub fn renormalize<S: AsRef<NodeRecord>>(&self, siblings: &[S]) -> HashMap<String, f64> {
        log::debug!("renormalizing {} siblings", siblings.len());
        sorted(siblings)
            .into_iter()
            .enumerate()
            .map(|(slot, node)| (node.id.clone(), self.slot_order(slot)))
            .collect()
    }

    /// Places a new node at `index` among `siblings` (in `(order, id)`
    /// sequence), renumbering the group only when the gap is exhausted.
    ///
    /// `index` is clamped to the group length; `siblings` must not contain
    /// the node being placed.
    #[must_use]
    pub fn insert_at<S: AsRef<NodeRecord>>(&self, siblings: &[S], index: usize) -> InsertPlan {
        let sorted = sorted(siblings);
        let index = index.min(sorted.len());
        let before = index.checked_sub(1).map(|i| sorted[i].order);
        let after = sorted.get(index).map(|n| n.order);

        if !self.needs_renormalization(before, after) {
            let order = self.calculate_insert_order(before, after);
            // One-sided inserts can still collapse onto their bound once
            // `spacing` drops below the resolution of the neighbour's order.
            if before.map_or(true, |lo| order > lo) && after.map_or(true, |hi| order < hi) {
                return InsertPlan::at(order);
            }
        }

        log::debug!(
            "no room between {before:?} and {after:?}; renumbering {} siblings",
            sorted.len()
        );
        InsertPlan {
            order: self.slot_order(index),
            renumbered: self.renumber_around(&sorted, index, false),
        }
    }

    /// Places a new node after every sibling.
    ///
    /// Same order as [`next_order`](Self::next_order) unless the last sibling's
    /// order is too large to step past, in which case the group is renumbered.
    #[must_use]
    pub fn append<S: AsRef<NodeRecord>>(&self, siblings: &[S]) -> InsertPlan {
        self.insert_at(siblings, siblings.len())
    }

    /// Always renumbers the group densely, leaving slot `index` for the new
    /// node. Only siblings whose order actually changes are returned.
    #[must_use]
    pub fn dense_reorder<S: AsRef<NodeRecord>>(&self, siblings: &[S], index: usize) -> InsertPlan {
        let sorted = sorted(siblings);
        let index = index.min(sorted.len());
        InsertPlan {
            order: self.slot_order(index),
            renumbered: self.renumber_around(&sorted, index, true),
        }
    }

    fn renumber_around(
        &self,
        sorted: &[&NodeRecord],
        hole: usize,
        changed_only: bool,
    ) -> HashMap<String, f64> {
        sorted
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let slot = if i < hole { i } else { i + 1 };
                (*node, self.slot_order(slot))
            })
            .filter(|(node, order)| !changed_only || node.order != *order)
            .map(|(node, order)| (node.id.clone(), order))
            .collect()
    }

    /// Order of the `slot`-th sibling in an evenly spaced group.
    #[must_use]
    pub fn slot_order(&self, slot: usize) -> f64 {
        self.config.start + slot as f64 * self.config.spacing
    }

    fn snap_down(&self, value: f64) -> f64 {
        match self.config.precision {
            OrderPrecision::Integer => value.floor(),
            OrderPrecision::Float { .. } => value,
        }
    }

    fn snap_up(&self, value: f64) -> f64 {
        match self.config.precision {
            OrderPrecision::Integer => value.ceil(),
            OrderPrecision::Float { .. } => value,
        }
    }
}

fn sorted<S: AsRef<NodeRecord>>(siblings: &[S]) -> Vec<&NodeRecord> {
    let mut sorted: Vec<&NodeRecord> = siblings.iter().map(S::as_ref).collect();
    sorted.sort_by(|a, b| sibling_cmp(a, b));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::file;

    fn float_alloc() -> OrderAllocator {
        OrderAllocator::new(OrderConfig {
            precision: OrderPrecision::Float { min_gap: 1e-9 },
            ..OrderConfig::default()
        })
        .unwrap()
    }

    fn siblings(orders: &[(&str, f64)]) -> Vec<NodeRecord> {
        orders.iter().map(|(id, o)| file(id, Some("p"), *o)).collect()
    }

    #[test]
    fn test_next_order() {
        let alloc = OrderAllocator::default();
        let empty: [NodeRecord; 0] = [];
        assert_eq!(alloc.next_order(&empty), 1.0);
        assert_eq!(alloc.next_order(&siblings(&[("a", 1.0), ("b", 5.0)])), 6.0);
        assert_eq!(alloc.next_order(&siblings(&[("a", 2.5)])), 3.0);
    }

    #[test]
    fn test_calculate_insert_order_cases() {
        let alloc = OrderAllocator::default();
        assert_eq!(alloc.calculate_insert_order(Some(2.0), Some(6.0)), 4.0);
        assert_eq!(alloc.calculate_insert_order(Some(1.0), Some(4.0)), 2.0);
        assert_eq!(alloc.calculate_insert_order(None, Some(3.0)), 2.0);
        assert_eq!(alloc.calculate_insert_order(None, Some(0.0)), -1.0);
        assert_eq!(alloc.calculate_insert_order(Some(3.0), None), 4.0);
        assert_eq!(alloc.calculate_insert_order(None, None), 1.0);

        let float = float_alloc();
        assert_eq!(float.calculate_insert_order(Some(1.0), Some(2.0)), 1.5);
    }

    #[test]
    fn test_adjacent_integers_need_renormalization() {
        let alloc = OrderAllocator::default();
        assert!(alloc.needs_renormalization(Some(1.0), Some(2.0)));
        assert!(!alloc.needs_renormalization(Some(1.0), Some(3.0)));
        assert!(alloc.needs_renormalization(Some(2.0), Some(2.0)));
        assert!(alloc.needs_renormalization(Some(3.0), Some(2.0)));
        assert!(!alloc.needs_renormalization(None, Some(1.0)));
        assert!(!alloc.needs_renormalization(Some(1.0), None));
        assert!(!alloc.needs_renormalization(None, None));
    }

    #[test]
    fn test_float_precision_exhaustion() {
        let alloc = float_alloc();
        assert!(!alloc.needs_renormalization(Some(1.0), Some(2.0)));
        assert!(alloc.needs_renormalization(Some(1.0), Some(1.0 + 1e-12)));
        assert!(alloc.needs_renormalization(Some(1.0), Some(f64::from_bits(1.0f64.to_bits() + 1))));
    }

    #[test]
    fn test_renormalize_then_insert_has_room() {
        let alloc = float_alloc();
        let group = siblings(&[("a", 1.0), ("b", 1.0 + 1e-12), ("c", 7.0)]);
        assert!(alloc.needs_renormalization(Some(group[0].order), Some(group[1].order)));

        let orders = alloc.renormalize(&group);
        assert_eq!(orders["a"], 1.0);
        assert_eq!(orders["b"], 2.0);
        assert_eq!(orders["c"], 3.0);
        assert!(!alloc.needs_renormalization(Some(orders["a"]), Some(orders["b"])));
        let mid = alloc.calculate_insert_order(Some(orders["a"]), Some(orders["b"]));
        assert!(mid > orders["a"] && mid < orders["b"]);
    }

    #[test]
    fn test_renormalize_breaks_ties_by_id() {
        let alloc = OrderAllocator::default();
        let orders = alloc.renormalize(&siblings(&[("b", 4.0), ("a", 4.0), ("c", 0.5)]));
        assert_eq!(orders["c"], 1.0);
        assert_eq!(orders["a"], 2.0);
        assert_eq!(orders["b"], 3.0);
    }

    #[test]
    fn test_insert_at_uses_midpoint_when_room() {
        let alloc = OrderAllocator::default();
        let plan = alloc.insert_at(&siblings(&[("a", 1.0), ("b", 5.0)]), 1);
        assert_eq!(plan.order, 3.0);
        assert!(plan.renumbered.is_empty());
    }

    #[test]
    fn test_insert_between_adjacent_integers_renumbers_group() {
        let alloc = OrderAllocator::default();
        let group = siblings(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]);
        assert!(alloc.needs_renormalization(Some(1.0), Some(2.0)));

        let plan = alloc.insert_at(&group, 1);
        let (a, b) = (plan.renumbered["a"], plan.renumbered["b"]);
        assert!(a < plan.order && plan.order < b, "{a} < {} < {b}", plan.order);
        assert_eq!(plan.renumbered["c"], 4.0);
        assert_eq!(plan.order.fract(), 0.0);
    }

    #[test]
    fn test_insert_at_ends_and_clamps() {
        let alloc = OrderAllocator::default();
        let group = siblings(&[("a", 1.0), ("b", 2.0)]);
        assert_eq!(alloc.insert_at(&group, 0).order, 0.0);
        assert_eq!(alloc.insert_at(&group, 2).order, 3.0);
        assert_eq!(alloc.insert_at(&group, 99).order, 3.0);
        let empty: [&NodeRecord; 0] = [];
        assert_eq!(alloc.insert_at(&empty, 0).order, 1.0);
    }

    #[test]
    fn test_no_integer_room_at_large_orders() {
        let alloc = OrderAllocator::default();
        let lo = 2f64.powi(53);
        let hi = lo + 2.0;
        // lo + 1 is not representable, so the midpoint rounds onto a bound.
        assert!(alloc.needs_renormalization(Some(lo), Some(hi)));

        let plan = alloc.insert_at(&siblings(&[("a", lo), ("b", hi)]), 1);
        let (a, b) = (plan.renumbered["a"], plan.renumbered["b"]);
        assert!(a < plan.order && plan.order < b, "{a} < {} < {b}", plan.order);
    }

    #[test]
    fn test_append_past_large_order_renumbers() {
        let alloc = OrderAllocator::default();
        let group = siblings(&[("a", 1e17)]);
        assert!(!alloc.needs_renormalization(Some(1e17), None));

        let plan = alloc.append(&group);
        assert!(plan.order > plan.renumbered["a"]);
        assert_eq!(plan.renumbered["a"], 1.0);
        assert_eq!(plan.order, 2.0);

        let prepend = alloc.insert_at(&group, 0);
        assert!(prepend.order < prepend.renumbered["a"]);
        assert_eq!(prepend.order, 1.0);
    }

    #[test]
    fn test_append_matches_next_order() {
        let alloc = OrderAllocator::default();
        let group = siblings(&[("a", 1.0), ("b", 5.0)]);
        let plan = alloc.append(&group);
        assert_eq!(plan.order, alloc.next_order(&group));
        assert!(plan.renumbered.is_empty());
    }

    #[test]
    fn test_dense_reorder_only_reports_changes() {
        let alloc = OrderAllocator::default();
        let plan = alloc.dense_reorder(&siblings(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]), 1);
        assert_eq!(plan.order, 2.0);
        assert!(!plan.renumbered.contains_key("a"));
        assert_eq!(plan.renumbered["b"], 3.0);
        assert_eq!(plan.renumbered["c"], 4.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = OrderConfig {
            spacing: -1.0,
            ..OrderConfig::default()
        };
        assert!(OrderAllocator::new(config).is_err());
    }
}
