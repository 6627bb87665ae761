//! Tree augmentation events
//!
//! The red-black core calls into a `TreeAugmentation` at fixed points of
//! every structural change. An augmentation uses these events to keep
//! per-node aggregates (for the interval tree: subtree min/max) in step with
//! the shape of the tree.
//!
//! # Event order
//!
//! Insertion: `pre_insert(z)` once `z` is spliced in, then one
//! `pre_rotate`/`post_rotate` pair per fix-up rotation, then `post_insert(z)`.
//!
//! Deletion: `pre_delete(z)` while `z` is still linked, `replace_node(u, v)`
//! for every transplant, rotation pairs from the fix-up, then
//! `post_delete(data, x, x_parent)` after balance is restored.
//!
//! Rotation: `x` is the node rotated down, `y` the child that takes its
//! place. In `post_rotate`, `y` is already the parent of `x`.

use crate::node::NodeArena;
use crate::types::NodeId;

/// Event hooks fired by `RbTree` around structural mutation.
///
/// All hooks except `duplicate_node` default to no-ops.
pub trait TreeAugmentation<T> {
    /// Before the links of a rotation change.
    fn pre_rotate(&mut self, _nodes: &mut NodeArena<T>, _x: NodeId, _y: NodeId) {}

    /// After a rotation relinked `x` below `y`.
    fn post_rotate(&mut self, _nodes: &mut NodeArena<T>, _x: NodeId, _y: NodeId) {}

    /// After `z` is linked into the tree, before rebalancing.
    fn pre_insert(&mut self, _nodes: &mut NodeArena<T>, _z: NodeId) {}

    /// After insertion rebalancing finished.
    fn post_insert(&mut self, _nodes: &mut NodeArena<T>, _z: NodeId) {}

    /// Before `z` is detached.
    fn pre_delete(&mut self, _nodes: &mut NodeArena<T>, _z: NodeId) {}

    /// After deletion rebalancing finished.
    ///
    /// `removed` is the data of the detached node, which is handed back to
    /// the caller of `delete` when this hook returns. `x` is the node that
    /// moved into the spliced slot (absent when the slot became empty) and
    /// `x_parent` its parent at splice time.
    fn post_delete(
        &mut self,
        _nodes: &mut NodeArena<T>,
        _removed: &T,
        _x: Option<NodeId>,
        _x_parent: Option<NodeId>,
    ) {
    }

    /// `v` took over the structural position of `u`.
    fn replace_node(&mut self, _nodes: &mut NodeArena<T>, _u: NodeId, _v: Option<NodeId>) {}

    /// Produce the data for the copy of a node when duplicating a tree.
    fn duplicate_node(&self, data: &T) -> T;
}

/// Augmentation that maintains nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAugmentation;

impl<T: Clone> TreeAugmentation<T> for NoAugmentation {
    fn duplicate_node(&self, data: &T) -> T {
        data.clone()
    }
}
