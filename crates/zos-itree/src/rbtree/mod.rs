//! Red-black core
//!
//! A red-black tree over `u64` keys whose nodes live in a `NodeArena`.
//! Equal keys are allowed: insertion descends right on a tie, so in-order
//! iteration yields equal keys in insertion order.
//!
//! Every structural change is reported to the tree's `TreeAugmentation`
//! (see `augment` for the exact event order).

mod balance;
mod copy;
mod iter;

pub use iter::Iter;

use crate::augment::{NoAugmentation, TreeAugmentation};
use crate::node::{Node, NodeArena};
use crate::types::{Color, IterOrder, Key, NodeId, TreeConfig, TreeError};

/// Red-black tree generic over its node data and augmentation.
#[derive(Debug)]
pub struct RbTree<T, A = NoAugmentation> {
    pub(crate) nodes: NodeArena<T>,
    pub(crate) root: Option<NodeId>,
    pub(crate) aug: A,
    pub(crate) config: TreeConfig,
}

impl<T: Clone> RbTree<T, NoAugmentation> {
    /// Create an empty tree without augmentation.
    pub fn new() -> Self {
        Self::with_augmentation(NoAugmentation)
    }

    pub fn with_config(config: TreeConfig) -> Self {
        Self::with_augmentation_and_config(NoAugmentation, config)
    }
}

impl<T: Clone> Default for RbTree<T, NoAugmentation> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Read-only access
// ============================================================================

impl<T, A> RbTree<T, A> {
    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// The node arena, for read-only inspection.
    pub fn nodes(&self) -> &NodeArena<T> {
        &self.nodes
    }

    pub fn augmentation(&self) -> &A {
        &self.aug
    }

    /// Mutable access to the augmentation state.
    ///
    /// Only state that does not describe the current shape of the tree (for
    /// example, an observer's counters) should be changed through this.
    pub fn augmentation_mut(&mut self) -> &mut A {
        &mut self.aug
    }

    /// Whether `id` names a node of this tree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.try_get(id)
    }

    pub fn data(&self, id: NodeId) -> Option<&T> {
        self.nodes.try_get(id).map(Node::data)
    }

    /// Mutable access to a node's data.
    ///
    /// Changing data that an augmentation summarizes leaves its summaries
    /// stale; delete and re-insert instead.
    pub fn data_mut(&mut self, id: NodeId) -> Option<&mut T> {
        if self.nodes.contains(id) {
            Some(self.nodes.data_mut(id))
        } else {
            None
        }
    }

    /// Find a node with `key`. With duplicate keys, the first one met on the
    /// descent is returned.
    pub fn find(&self, key: Key) -> Option<NodeId> {
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = self.nodes.get(id);
            if key == node.key {
                return Some(id);
            }
            cur = if key < node.key { node.left } else { node.right };
        }
        None
    }

    /// Find the in-order first node with `key`.
    pub fn find_first(&self, key: Key) -> Option<NodeId> {
        let mut candidate = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = self.nodes.get(id);
            if node.key >= key {
                candidate = Some(id);
                cur = node.left;
            } else {
                cur = node.right;
            }
        }
        candidate.filter(|&id| self.nodes.key(id) == key)
    }

    /// Find the node with `key`, or the last node visited while searching
    /// for it. `None` only when the tree is empty.
    pub fn find_closest(&self, key: Key) -> Option<NodeId> {
        let mut last = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            last = Some(id);
            let node = self.nodes.get(id);
            if key == node.key {
                return Some(id);
            }
            cur = if key < node.key { node.left } else { node.right };
        }
        last
    }

    pub fn get(&self, key: Key) -> Option<&T> {
        self.find(key).map(|id| self.nodes.data(id))
    }

    pub fn get_mut(&mut self, key: Key) -> Option<&mut T> {
        let id = self.find(key)?;
        Some(self.nodes.data_mut(id))
    }

    /// Node with the smallest key.
    pub fn first(&self) -> Option<NodeId> {
        self.root.map(|root| self.subtree_min(root))
    }

    /// Node with the largest key.
    pub fn last(&self) -> Option<NodeId> {
        self.root.map(|root| self.subtree_max(root))
    }

    /// In-order successor of `id`.
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.nodes.right(id) {
            return Some(self.subtree_min(right));
        }
        let mut child = id;
        let mut parent = self.nodes.parent(id);
        while let Some(p) = parent {
            if self.nodes.left(p) == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.nodes.parent(p);
        }
        None
    }

    /// In-order predecessor of `id`.
    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self.nodes.left(id) {
            return Some(self.subtree_max(left));
        }
        let mut child = id;
        let mut parent = self.nodes.parent(id);
        while let Some(p) = parent {
            if self.nodes.right(p) == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.nodes.parent(p);
        }
        None
    }

    /// Ascending in-order cursor.
    pub fn iter(&self) -> Iter<'_, T, A> {
        Iter::new(self, self.first(), IterOrder::Forward)
    }

    /// Descending in-order cursor.
    pub fn iter_reverse(&self) -> Iter<'_, T, A> {
        Iter::new(self, self.last(), IterOrder::Reverse)
    }

    /// Cursor starting at `id` (inclusive) walking in `order`.
    pub fn iter_from(&self, id: NodeId, order: IterOrder) -> Iter<'_, T, A> {
        let start = if self.nodes.contains(id) { Some(id) } else { None };
        Iter::new(self, start, order)
    }

    pub(crate) fn subtree_min(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes.left(id) {
            id = left;
        }
        id
    }

    pub(crate) fn subtree_max(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.nodes.right(id) {
            id = right;
        }
        id
    }

    /// Color of a possibly absent node. Absent nodes are black.
    pub(crate) fn color_of(&self, id: Option<NodeId>) -> Color {
        id.map_or(Color::Black, |id| self.nodes.color(id))
    }
}

// ============================================================================
// Mutation
// ============================================================================

impl<T, A: TreeAugmentation<T>> RbTree<T, A> {
    pub fn with_augmentation(aug: A) -> Self {
        Self::with_augmentation_and_config(aug, TreeConfig::new())
    }

    pub fn with_augmentation_and_config(aug: A, config: TreeConfig) -> Self {
        Self {
            nodes: NodeArena::with_config(&config),
            root: None,
            aug,
            config,
        }
    }

    /// Insert `data` under `key` and return the new node's id.
    ///
    /// The node is allocated before any link is touched, so an allocation
    /// failure leaves the tree exactly as it was.
    pub fn insert(&mut self, key: Key, data: T) -> Result<NodeId, TreeError> {
        let z = self.nodes.alloc(key, data)?;

        let mut parent = None;
        let mut go_left = false;
        let mut cur = self.root;
        while let Some(id) = cur {
            parent = Some(id);
            let node = self.nodes.get(id);
            go_left = key < node.key;
            cur = if go_left { node.left } else { node.right };
        }

        self.nodes.get_mut(z).parent = parent;
        match parent {
            None => self.root = Some(z),
            Some(p) if go_left => self.nodes.get_mut(p).left = Some(z),
            Some(p) => self.nodes.get_mut(p).right = Some(z),
        }

        self.aug.pre_insert(&mut self.nodes, z);
        self.insert_fixup(z);
        self.aug.post_insert(&mut self.nodes, z);
        Ok(z)
    }

    /// Remove node `z` and return its data.
    ///
    /// # Panics
    ///
    /// Panics if `z` is not a live node of this tree.
    pub fn delete(&mut self, z: NodeId) -> T {
        assert!(self.nodes.contains(z), "zos-itree: delete of foreign node {}", z);
        self.aug.pre_delete(&mut self.nodes, z);

        let z_left = self.nodes.left(z);
        let z_right = self.nodes.right(z);
        let mut removed_color = self.nodes.color(z);
        let x;
        let x_parent;

        match (z_left, z_right) {
            (None, _) => {
                x = z_right;
                x_parent = self.nodes.parent(z);
                self.transplant(z, z_right);
            }
            (Some(_), None) => {
                x = z_left;
                x_parent = self.nodes.parent(z);
                self.transplant(z, z_left);
            }
            (Some(left), Some(right)) => {
                let y = self.subtree_min(right);
                removed_color = self.nodes.color(y);
                x = self.nodes.right(y);
                if self.nodes.parent(y) == Some(z) {
                    x_parent = Some(y);
                } else {
                    x_parent = self.nodes.parent(y);
                    self.transplant(y, x);
                    self.nodes.get_mut(y).right = Some(right);
                    self.nodes.get_mut(right).parent = Some(y);
                }
                self.transplant(z, Some(y));
                self.nodes.get_mut(y).left = Some(left);
                self.nodes.get_mut(left).parent = Some(y);
                let z_color = self.nodes.color(z);
                self.nodes.get_mut(y).color = z_color;
            }
        }

        if removed_color == Color::Black {
            self.delete_fixup(x, x_parent);
        }

        let removed = self.nodes.release(z);
        self.aug
            .post_delete(&mut self.nodes, &removed.data, x, x_parent);
        removed.data
    }

    /// Delete a node with `key` (the one `find` returns).
    pub fn delete_key(&mut self, key: Key) -> Option<T> {
        let id = self.find(key)?;
        Some(self.delete(id))
    }

    /// Remove every node. No events fire.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }
}
