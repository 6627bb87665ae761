use core::iter::FusedIterator;

use super::RbTree;
use crate::node::Node;
use crate::types::{IterOrder, NodeId};

/// One-shot in-order cursor over an `RbTree`.
///
/// The cursor holds a shared borrow of the tree, so the tree cannot be
/// mutated while it is alive.
pub struct Iter<'a, T, A> {
    tree: &'a RbTree<T, A>,
    next: Option<NodeId>,
    order: IterOrder,
}

impl<'a, T, A> Iter<'a, T, A> {
    pub(crate) fn new(tree: &'a RbTree<T, A>, start: Option<NodeId>, order: IterOrder) -> Self {
        Self {
            tree,
            next: start,
            order,
        }
    }

    pub fn order(&self) -> IterOrder {
        self.order
    }
}

impl<'a, T, A> Iterator for Iter<'a, T, A> {
    type Item = (NodeId, &'a Node<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = match self.order {
            IterOrder::Forward => self.tree.next(id),
            IterOrder::Reverse => self.tree.prev(id),
        };
        Some((id, self.tree.nodes.get(id)))
    }
}

impl<T, A> FusedIterator for Iter<'_, T, A> {}
