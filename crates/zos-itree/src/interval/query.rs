//! Overlap and proximity queries.

use alloc::vec::Vec;

use super::{IntervalNode, IntervalTree};
use crate::types::{Interval, NodeId};

impl<P, E> IntervalTree<P, E> {
    /// Any one entry overlapping `query`, or `None` if none does.
    ///
    /// Single root-to-leaf descent. When the left subtree reaches far enough
    /// right (`max >= query.start`) the search commits to it: if nothing
    /// there overlaps, nothing in the right subtree does either, because
    /// every start on the right is at least every start on the left.
    pub fn find_overlapping(&self, query: Interval) -> Option<&IntervalNode<P>> {
        let nodes = self.tree.nodes();
        let mut cur = self.tree.root();
        while let Some(id) = cur {
            let data = nodes.data(id);
            if data.interval.overlaps(&query) {
                return Some(data);
            }
            let left = nodes.left(id);
            cur = match left {
                Some(l) if nodes.data(l).max >= query.start => Some(l),
                _ => nodes.right(id),
            };
        }
        None
    }

    /// Every entry overlapping `query`, in ascending start order.
    pub fn find_all_overlapping(&self, query: Interval) -> Vec<&IntervalNode<P>> {
        let mut out = Vec::new();
        self.collect_overlapping(self.tree.root(), query, &mut out);
        out
    }

    fn collect_overlapping<'a>(
        &'a self,
        id: Option<NodeId>,
        query: Interval,
        out: &mut Vec<&'a IntervalNode<P>>,
    ) {
        let Some(id) = id else {
            return;
        };
        let nodes = self.tree.nodes();
        let data = nodes.data(id);
        if data.max < query.start || data.min > query.end {
            return;
        }

        self.collect_overlapping(nodes.left(id), query, out);
        if data.interval.overlaps(&query) {
            out.push(data);
        }
        if data.interval.start <= query.end {
            self.collect_overlapping(nodes.right(id), query, out);
        }
    }

    /// An overlapping entry if the descent finds one, otherwise the entry
    /// judged nearest to `query`.
    ///
    /// This is a greedy descent, not an exact nearest-neighbour search: at
    /// each node it compares the node's own distance with the distance of
    /// each child's subtree extent and stops or steps toward the smaller.
    /// A missing child scores as the empty extent `[u64::MAX, 0]`, so the
    /// descent may step off the tree, in which case the last node visited
    /// is returned. `None` only when the tree is empty.
    pub fn find_closest(&self, query: Interval) -> Option<&IntervalNode<P>> {
        let nodes = self.tree.nodes();
        let mut closest = None;
        let mut cur = self.tree.root();

        while let Some(id) = cur {
            let data = nodes.data(id);
            if data.interval.overlaps(&query) {
                return Some(data);
            }
            closest = Some(data);

            let left = nodes.left(id);
            let right = nodes.right(id);
            for child in [left, right].into_iter().flatten() {
                let child = nodes.data(child);
                if child.interval.overlaps(&query) {
                    return Some(child);
                }
            }

            let own = distance(data.interval, query);
            let left_dist = left.map_or_else(
                || absent_distance(query),
                |l| distance(nodes.data(l).extent(), query),
            );
            let right_dist = right.map_or_else(
                || absent_distance(query),
                |r| distance(nodes.data(r).extent(), query),
            );

            if own < left_dist && own < right_dist {
                return Some(data);
            }
            cur = if left_dist <= right_dist { left } else { right };
        }

        closest
    }
}

/// Distance between `a` and `query`: the nearer of the start gap and the
/// end gap.
fn distance(a: Interval, query: Interval) -> u64 {
    a.start
        .abs_diff(query.start)
        .min(a.end.abs_diff(query.end))
}

/// Distance to a missing subtree, whose extent is `[u64::MAX, 0]`.
fn absent_distance(query: Interval) -> u64 {
    u64::MAX.abs_diff(query.start).min(query.end)
}
