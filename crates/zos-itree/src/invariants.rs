//! Runtime-checkable tree invariants
//!
//! These are used by unit and property tests and are cheap enough to call
//! after every mutation in debug runs.
//!
//! # Invariants
//!
//! 1. **Root**: The root is black and has no parent
//! 2. **Links**: Every link names a live node, and each child points back
//!    at its parent
//! 3. **Order**: In-order keys never decrease
//! 4. **Red-Red**: A red node has no red child
//! 5. **Black Height**: Every root-to-leaf path crosses the same number of
//!    black nodes
//! 6. **Count**: The nodes reachable from the root are exactly the live ones
//! 7. **Summary** (interval trees only): each node's `{min, max}` is the
//!    fold of its own interval with its children's summaries

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::interval::IntervalTree;
use crate::rbtree::RbTree;
use crate::types::{Color, Key, NodeId};

/// An invariant violation with details
#[derive(Clone, Debug)]
pub struct InvariantViolation {
    /// Name of the violated invariant
    pub invariant: &'static str,
    /// Description of what went wrong
    pub description: String,
}

impl InvariantViolation {
    fn new(invariant: &'static str, description: String) -> Self {
        Self {
            invariant,
            description,
        }
    }
}

/// Check the red-black invariants of any tree.
///
/// Returns a list of violations (empty if all invariants hold).
pub fn check_tree<T, A>(tree: &RbTree<T, A>) -> Vec<InvariantViolation> {
    let mut walk = Walk {
        tree,
        visited: 0,
        violations: Vec::new(),
    };

    if let Some(root) = tree.root() {
        match tree.node(root) {
            Some(node) => {
                if node.color() != Color::Black {
                    walk.push("root", format!("Root {} is red", root));
                }
                if node.parent().is_some() {
                    walk.push("root", format!("Root {} has a parent", root));
                }
            }
            None => walk.push("links", format!("Root {} is not a live node", root)),
        }
    }

    walk.subtree(tree.root(), None, None, None);

    if walk.visited != tree.len() {
        let description = format!(
            "{} nodes reachable from the root, {} live",
            walk.visited,
            tree.len()
        );
        walk.push("count", description);
    }

    walk.violations
}

/// Check the red-black invariants plus the `{min, max}` summaries.
pub fn check_interval_tree<P, E>(tree: &IntervalTree<P, E>) -> Vec<InvariantViolation> {
    let core = tree.tree();
    let mut violations = check_tree(core);
    if !violations.is_empty() {
        // Summaries are meaningless on a broken shape
        return violations;
    }

    let nodes = core.nodes();
    for (id, node) in core.iter() {
        let data = node.data();
        let interval = data.interval();

        if node.key() != interval.start {
            violations.push(InvariantViolation::new(
                "summary",
                format!("Node {} keyed {:#x} holds {}", id, node.key(), interval),
            ));
        }
        if interval.start > interval.end {
            violations.push(InvariantViolation::new(
                "summary",
                format!("Node {} holds reversed interval {}", id, interval),
            ));
        }

        let mut min = interval.start;
        let mut max = interval.end;
        for child in [node.left(), node.right()].into_iter().flatten() {
            let child = nodes.data(child);
            min = min.min(child.min());
            max = max.max(child.max());
        }
        if data.min() != min || data.max() != max {
            violations.push(InvariantViolation::new(
                "summary",
                format!(
                    "Node {} caches [{:#x}, {:#x}], subtree spans [{:#x}, {:#x}]",
                    id,
                    data.min(),
                    data.max(),
                    min,
                    max
                ),
            ));
        }
    }

    violations
}

/// Assert all invariants hold (panic if not)
pub fn assert_tree<T, A>(tree: &RbTree<T, A>) {
    let violations = check_tree(tree);
    if let Some(v) = violations.first() {
        panic!("Invariant violated: {} ({})", v.invariant, v.description);
    }
}

struct Walk<'a, T, A> {
    tree: &'a RbTree<T, A>,
    visited: usize,
    violations: Vec<InvariantViolation>,
}

impl<T, A> Walk<'_, T, A> {
    fn push(&mut self, invariant: &'static str, description: String) {
        self.violations
            .push(InvariantViolation::new(invariant, description));
    }

    /// Walk the subtree at `id`, whose keys must lie in `[lo, hi]`, and
    /// return its black height.
    fn subtree(
        &mut self,
        id: Option<NodeId>,
        parent: Option<NodeId>,
        lo: Option<Key>,
        hi: Option<Key>,
    ) -> usize {
        let Some(id) = id else {
            return 0;
        };
        let tree = self.tree;
        let node = match tree.node(id) {
            Some(node) => node,
            None => {
                self.push("links", format!("Link to dead node {}", id));
                return 0;
            }
        };

        self.visited += 1;
        if self.visited > tree.len() {
            // Only reachable through a cycle or a shared child
            self.push("links", format!("Node {} reached more than once", id));
            return 0;
        }

        if node.parent() != parent {
            self.push(
                "links",
                format!(
                    "Node {} has parent {:?}, expected {:?}",
                    id,
                    node.parent(),
                    parent
                ),
            );
        }

        let key = node.key();
        if lo.is_some_and(|lo| key < lo) || hi.is_some_and(|hi| key > hi) {
            self.push(
                "order",
                format!("Node {} key {:#x} outside [{:?}, {:?}]", id, key, lo, hi),
            );
        }

        if node.color() == Color::Red {
            for child in [node.left(), node.right()].into_iter().flatten() {
                if tree.node(child).map(|c| c.color()) == Some(Color::Red) {
                    self.push(
                        "red_red",
                        format!("Red node {} has red child {}", id, child),
                    );
                }
            }
        }

        let left = self.subtree(node.left(), Some(id), lo, Some(key));
        let right = self.subtree(node.right(), Some(id), Some(key), hi);
        if left != right {
            self.push(
                "black_height",
                format!("Node {} has black heights {} (left) and {} (right)", id, left, right),
            );
        }

        let own = usize::from(node.color() == Color::Black);
        left.max(right) + own
    }
}

// ============================================================================
// Kani proofs for invariants
// ============================================================================

#[cfg(kani)]
mod proofs {
    use super::*;
    use crate::types::Interval;

    /// Proof: Three insertions in any order leave a valid tree
    #[kani::proof]
    #[kani::unwind(8)]
    fn insert_maintains_invariants() {
        let mut tree = IntervalTree::new();
        for _ in 0..3 {
            let start: u8 = kani::any();
            let len: u8 = kani::any();
            let interval = Interval::new(start as u64, start as u64 + len as u64);
            let _ = tree.insert(interval, ());
        }

        kani::assert(
            check_interval_tree(&tree).is_empty(),
            "Insertion should maintain invariants",
        );
    }
}
