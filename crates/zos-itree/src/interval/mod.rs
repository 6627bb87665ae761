//! Interval tree
//!
//! Intervals are stored in a red-black tree keyed by `interval.start`. Each
//! node caches the smallest start (`min`) and largest end (`max`) found in
//! its subtree; `IntervalAugment` keeps these summaries exact through every
//! insertion, deletion and rotation, and the queries use them to prune.
//!
//! Intervals are closed: `[1, 5]` and `[5, 9]` overlap.
//!
//! # Payload ownership
//!
//! The tree owns each payload until the interval is deleted, at which point
//! the payload is returned to the caller. Duplicated trees get payloads only
//! through the event table's `copy_payload`; without one, copied intervals
//! carry no payload.

mod augment;
mod query;

pub use augment::{ClonePayloads, IntervalAugment, IntervalEvents, NoEvents};

use alloc::vec::Vec;

use crate::invariants::{check_interval_tree, InvariantViolation};
use crate::rbtree::RbTree;
use crate::types::{Interval, NodeId, TreeConfig, TreeError};

/// Per-node payload wrapper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntervalNode<P> {
    pub(crate) interval: Interval,
    pub(crate) min: u64,
    pub(crate) max: u64,
    pub(crate) payload: Option<P>,
}

impl<P> IntervalNode<P> {
    fn new(interval: Interval, payload: P) -> Self {
        Self {
            interval,
            min: interval.start,
            max: interval.end,
            payload: Some(payload),
        }
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Smallest start in this node's subtree.
    pub fn min(&self) -> u64 {
        self.min
    }

    /// Largest end in this node's subtree.
    pub fn max(&self) -> u64 {
        self.max
    }

    /// `[min, max]` of the subtree.
    pub fn extent(&self) -> Interval {
        Interval::new(self.min, self.max)
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub fn payload_mut(&mut self) -> Option<&mut P> {
        self.payload.as_mut()
    }

    fn into_parts(self) -> (Interval, Option<P>) {
        (self.interval, self.payload)
    }
}

/// Augmented interval tree.
pub struct IntervalTree<P, E = NoEvents> {
    pub(crate) tree: RbTree<IntervalNode<P>, IntervalAugment<E>>,
}

impl<P> IntervalTree<P, NoEvents> {
    pub fn new() -> Self {
        Self::with_events(NoEvents)
    }
}

impl<P> Default for IntervalTree<P, NoEvents> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, E: IntervalEvents<P>> IntervalTree<P, E> {
    /// Create a tree that reports to `events`.
    pub fn with_events(events: E) -> Self {
        Self::with_config(events, TreeConfig::new())
    }

    pub fn with_config(events: E, config: TreeConfig) -> Self {
        Self {
            tree: RbTree::with_augmentation_and_config(IntervalAugment::new(events), config),
        }
    }

    /// Insert `interval` with its payload.
    ///
    /// Fails only when no node can be allocated; the tree is unchanged and
    /// the payload is dropped in that case.
    pub fn insert(&mut self, interval: Interval, payload: P) -> Result<(), TreeError> {
        self.tree
            .insert(interval.start, IntervalNode::new(interval, payload))?;
        Ok(())
    }

    /// Delete the entry whose interval equals `interval` and return it.
    ///
    /// Returns `None` and leaves the tree unchanged when no such entry exists.
    pub fn delete(&mut self, interval: Interval) -> Option<(Interval, Option<P>)> {
        let id = self.find_exact(interval)?;
        Some(self.tree.delete(id).into_parts())
    }

    /// Delete an entry whose interval starts at `start`, whatever its end.
    pub fn delete_start(&mut self, start: u64) -> Option<(Interval, Option<P>)> {
        self.tree.delete_key(start).map(IntervalNode::into_parts)
    }

    /// Payload of the entry whose interval equals `interval`.
    pub fn get_mut(&mut self, interval: Interval) -> Option<&mut P> {
        let id = self.find_exact(interval)?;
        self.tree.data_mut(id).and_then(IntervalNode::payload_mut)
    }

    /// Remove every entry. No events fire.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.tree.augmentation_mut().events
    }
}

impl<P, E: IntervalEvents<P> + Clone> IntervalTree<P, E> {
    /// Independent copy of the whole tree.
    pub fn copy(&self) -> Result<Self, TreeError> {
        Ok(Self {
            tree: self.tree.copy()?,
        })
    }

    /// Independent copy holding only the entries `pred` accepts.
    pub fn copy_if<F>(&self, mut pred: F) -> Result<Self, TreeError>
    where
        F: FnMut(&IntervalNode<P>) -> bool,
    {
        Ok(Self {
            tree: self.tree.copy_if(|_, node| pred(node))?,
        })
    }
}

impl<P, E> IntervalTree<P, E> {
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The underlying red-black tree.
    pub fn tree(&self) -> &RbTree<IntervalNode<P>, IntervalAugment<E>> {
        &self.tree
    }

    pub fn events(&self) -> &E {
        self.tree.augmentation().events()
    }

    /// Entry whose interval equals `interval`.
    pub fn get(&self, interval: Interval) -> Option<&IntervalNode<P>> {
        self.find_exact(interval).and_then(|id| self.tree.data(id))
    }

    /// Entry with the smallest start.
    pub fn first(&self) -> Option<&IntervalNode<P>> {
        self.tree.first().and_then(|id| self.tree.data(id))
    }

    /// Entry with the largest start.
    pub fn last(&self) -> Option<&IntervalNode<P>> {
        self.tree.last().and_then(|id| self.tree.data(id))
    }

    /// Entries in ascending start order.
    pub fn iter(&self) -> impl Iterator<Item = &IntervalNode<P>> + '_ {
        self.tree.iter().map(|(_, node)| node.data())
    }

    /// Entries in descending start order.
    pub fn iter_reverse(&self) -> impl Iterator<Item = &IntervalNode<P>> + '_ {
        self.tree.iter_reverse().map(|(_, node)| node.data())
    }

    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        check_interval_tree(self)
    }

    /// Node holding exactly `interval`; the in-order first among duplicates.
    fn find_exact(&self, interval: Interval) -> Option<NodeId> {
        let mut cur = self.tree.find_first(interval.start);
        while let Some(id) = cur {
            let node = self.tree.nodes().get(id);
            if node.key() != interval.start {
                return None;
            }
            if node.data().interval == interval {
                return Some(id);
            }
            cur = self.tree.next(id);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn tree_of(intervals: &[(u64, u64)]) -> IntervalTree<u32> {
        let mut tree = IntervalTree::new();
        for (i, &(start, end)) in intervals.iter().enumerate() {
            tree.insert(Interval::new(start, end), i as u32).unwrap();
        }
        tree
    }

    fn assert_valid<P, E>(tree: &IntervalTree<P, E>) {
        let violations = tree.check_invariants();
        assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn test_scenario_three_intervals() {
        let mut tree = tree_of(&[(1, 5), (10, 15), (3, 8)]);
        assert_valid(&tree);

        let hit = tree.find_overlapping(Interval::new(4, 4)).unwrap();
        assert!(hit.interval() == Interval::new(1, 5) || hit.interval() == Interval::new(3, 8));
        assert!(tree.find_overlapping(Interval::new(20, 25)).is_none());

        let (interval, payload) = tree.delete(Interval::new(3, 8)).unwrap();
        assert_eq!(interval, Interval::new(3, 8));
        assert_eq!(payload, Some(2));
        assert!(tree.find_overlapping(Interval::new(6, 7)).is_none());
        assert_valid(&tree);
    }

    #[test]
    fn test_root_summary_covers_everything() {
        let tree = tree_of(&[(40, 41), (5, 100), (7, 9), (60, 61), (1, 2)]);
        let root = tree.tree().root().unwrap();
        let summary = tree.tree().nodes().data(root);
        assert_eq!(summary.min(), 1);
        assert_eq!(summary.max(), 100);
        assert_eq!(summary.extent(), Interval::new(1, 100));
    }

    #[test]
    fn test_summaries_shrink_after_delete() {
        let mut tree = tree_of(&[(10, 20), (30, 1000), (50, 60), (5, 6)]);
        tree.delete(Interval::new(30, 1000)).unwrap();
        assert_valid(&tree);
        let root = tree.tree().root().unwrap();
        assert_eq!(tree.tree().nodes().data(root).max(), 60);

        tree.delete(Interval::new(5, 6)).unwrap();
        let root = tree.tree().root().unwrap();
        assert_eq!(tree.tree().nodes().data(root).min(), 10);
        assert_valid(&tree);
    }

    #[test]
    fn test_touching_intervals_overlap() {
        let tree = tree_of(&[(0, 9), (20, 29), (40, 49), (60, 69), (80, 89)]);
        let hit = tree.find_overlapping(Interval::new(9, 9)).unwrap();
        assert_eq!(hit.interval(), Interval::new(0, 9));
        let hit = tree.find_overlapping(Interval::new(30, 40)).unwrap();
        assert_eq!(hit.interval(), Interval::new(40, 49));
        assert!(tree.find_overlapping(Interval::new(50, 59)).is_none());
    }

    #[test]
    fn test_find_all_overlapping() {
        let tree = tree_of(&[(1, 5), (10, 15), (3, 8), (7, 12), (20, 30)]);
        let hits: Vec<Interval> = tree
            .find_all_overlapping(Interval::new(6, 10))
            .into_iter()
            .map(|n| n.interval())
            .collect();
        assert_eq!(
            hits,
            vec![Interval::new(3, 8), Interval::new(7, 12), Interval::new(10, 15)]
        );
        assert!(tree.find_all_overlapping(Interval::new(16, 19)).is_empty());
    }

    #[test]
    fn test_find_closest() {
        let empty: IntervalTree<u32> = IntervalTree::new();
        assert!(empty.find_closest(Interval::new(1, 2)).is_none());

        let tree = tree_of(&[(10, 19), (100, 109), (1000, 1009)]);
        // Overlap wins outright
        let hit = tree.find_closest(Interval::new(105, 200)).unwrap();
        assert_eq!(hit.interval(), Interval::new(100, 109));

        let near = tree.find_closest(Interval::new(120, 125)).unwrap();
        assert_eq!(near.interval(), Interval::new(100, 109));

        let single = tree_of(&[(50, 60)]);
        let only = single.find_closest(Interval::new(0, 1)).unwrap();
        assert_eq!(only.interval(), Interval::new(50, 60));
    }

    #[test]
    fn test_find_closest_steps_off_missing_child() {
        // Root [10, 1000] with a lone right child [11, 12]. The missing left
        // child scores 5 against the right child's 7, so the descent leaves
        // the tree and settles on the root.
        let tree = tree_of(&[(10, 1000), (11, 12)]);
        let near = tree.find_closest(Interval::new(0, 5)).unwrap();
        assert_eq!(near.interval(), Interval::new(10, 1000));
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut tree = tree_of(&[(1, 5), (10, 15)]);
        assert!(tree.delete(Interval::new(1, 6)).is_none());
        assert!(tree.delete(Interval::new(2, 5)).is_none());
        assert_eq!(tree.len(), 2);
        assert_valid(&tree);
    }

    #[test]
    fn test_same_start_exact_delete() {
        let mut tree = tree_of(&[(5, 10), (5, 20), (5, 7)]);
        let (interval, payload) = tree.delete(Interval::new(5, 20)).unwrap();
        assert_eq!(interval, Interval::new(5, 20));
        assert_eq!(payload, Some(1));
        assert!(tree.get(Interval::new(5, 10)).is_some());
        assert!(tree.get(Interval::new(5, 7)).is_some());
        assert_valid(&tree);

        let removed = tree.delete_start(5).unwrap();
        assert_eq!(removed.0.start, 5);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_get_mut_payload() {
        let mut tree = tree_of(&[(1, 2), (3, 4)]);
        *tree.get_mut(Interval::new(3, 4)).unwrap() = 99;
        assert_eq!(tree.get(Interval::new(3, 4)).unwrap().payload(), Some(&99));
        assert!(tree.get_mut(Interval::new(3, 5)).is_none());
    }

    #[test]
    fn test_iteration_order() {
        let tree = tree_of(&[(30, 31), (10, 11), (20, 21)]);
        let starts: Vec<u64> = tree.iter().map(|n| n.interval().start).collect();
        assert_eq!(starts, vec![10, 20, 30]);
        let starts: Vec<u64> = tree.iter_reverse().map(|n| n.interval().start).collect();
        assert_eq!(starts, vec![30, 20, 10]);
        assert_eq!(tree.first().unwrap().interval().start, 10);
        assert_eq!(tree.last().unwrap().interval().start, 30);
    }

    #[test]
    fn test_copy_without_cloner_drops_payloads() {
        let tree = tree_of(&[(1, 5), (10, 15), (3, 8)]);
        let copy = tree.copy().unwrap();
        assert_valid(&copy);
        assert_eq!(copy.len(), 3);
        assert!(copy.iter().all(|n| n.payload().is_none()));
        // Source keeps its payloads
        assert!(tree.iter().all(|n| n.payload().is_some()));
    }

    #[test]
    fn test_copy_with_cloner() {
        let mut tree = IntervalTree::with_events(ClonePayloads);
        for (i, start) in [40u64, 10, 30, 20].into_iter().enumerate() {
            tree.insert(Interval::new(start, start + 5), i).unwrap();
        }
        let mut copy = tree.copy().unwrap();
        let pairs = |t: &IntervalTree<usize, ClonePayloads>| {
            t.iter()
                .map(|n| (n.interval(), n.payload().copied()))
                .collect::<Vec<_>>()
        };
        assert_eq!(pairs(&copy), pairs(&tree));

        copy.delete(Interval::new(10, 15)).unwrap();
        *copy.get_mut(Interval::new(20, 25)).unwrap() = 77;
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.get(Interval::new(20, 25)).unwrap().payload(), Some(&3));
    }

    #[test]
    fn test_copy_if_recomputes_summaries() {
        let mut tree = IntervalTree::with_events(ClonePayloads);
        for start in 0..64u64 {
            let end = if start % 8 == 0 { start + 500 } else { start + 1 };
            tree.insert(Interval::new(start, end), start).unwrap();
        }
        let short = tree.copy_if(|n| n.interval().len() == 2).unwrap();
        assert_eq!(short.len(), 56);
        assert_valid(&short);
        let root = short.tree().root().unwrap();
        assert_eq!(short.tree().nodes().data(root).max(), 64);
        assert!(short.find_overlapping(Interval::new(200, 300)).is_none());
    }

    /// Counts events and clones payloads.
    #[derive(Clone, Default)]
    struct Counter {
        inserted: usize,
        removed: Vec<Interval>,
    }

    impl IntervalEvents<u32> for Counter {
        fn copy_payload(&self, payload: &u32) -> Option<u32> {
            Some(*payload)
        }
        fn on_insert(&mut self, _interval: Interval, payload: Option<&u32>) {
            assert!(payload.is_some());
            self.inserted += 1;
        }
        fn on_remove(&mut self, interval: Interval, _payload: Option<&u32>) {
            self.removed.push(interval);
        }
    }

    #[test]
    fn test_user_events() {
        let mut tree = IntervalTree::with_events(Counter::default());
        tree.insert(Interval::new(1, 2), 1).unwrap();
        tree.insert(Interval::new(3, 4), 2).unwrap();
        tree.delete(Interval::new(1, 2)).unwrap();
        assert!(tree.delete(Interval::new(9, 9)).is_none());

        assert_eq!(tree.events().inserted, 2);
        assert_eq!(tree.events().removed, vec![Interval::new(1, 2)]);

        tree.events_mut().inserted = 0;
        assert_eq!(tree.events().inserted, 0);
    }

    #[test]
    fn test_insert_failure_reports_out_of_memory() {
        let mut tree = IntervalTree::with_config(NoEvents, TreeConfig::new().with_max_nodes(2));
        tree.insert(Interval::new(1, 2), 'a').unwrap();
        tree.insert(Interval::new(3, 4), 'b').unwrap();
        assert_eq!(
            tree.insert(Interval::new(5, 6), 'c'),
            Err(TreeError::OutOfMemory)
        );
        assert_eq!(tree.len(), 2);
        assert!(tree.find_overlapping(Interval::new(5, 6)).is_none());
        assert_valid(&tree);
    }
}
