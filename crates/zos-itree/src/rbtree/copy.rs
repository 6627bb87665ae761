//! Tree duplication
//!
//! `copy` reproduces the source shape node for node (same keys, colors and
//! links). `copy_if` walks the source in order and inserts each node the
//! predicate keeps into the new tree during that same walk, so the result
//! is balanced by ordinary insertion and its augmentation is computed for
//! the smaller tree.
//!
//! Node data is produced by the source augmentation's `duplicate_node`.
//! The new tree gets a clone of the source augmentation and the same
//! configuration. On allocation failure the partial copy is dropped and the
//! source is untouched.

use alloc::vec::Vec;

use super::RbTree;
use crate::augment::TreeAugmentation;
use crate::types::{Key, NodeId, TreeError};

impl<T, A: TreeAugmentation<T> + Clone> RbTree<T, A> {
    /// Structural deep copy.
    pub fn copy(&self) -> Result<Self, TreeError> {
        let mut copy = Self::with_augmentation_and_config(self.aug.clone(), self.config);
        let root = match self.root {
            Some(root) => root,
            None => return Ok(copy),
        };

        // (source node, parent in the copy, is left child)
        let mut stack: Vec<(NodeId, Option<NodeId>, bool)> = Vec::new();
        stack.try_reserve(1).map_err(|_| TreeError::OutOfMemory)?;
        stack.push((root, None, false));

        while let Some((src, parent, is_left)) = stack.pop() {
            // Room for both children, so the pushes below never allocate
            stack.try_reserve(2).map_err(|_| TreeError::OutOfMemory)?;
            let node = self.nodes.get(src);
            let data = self.aug.duplicate_node(&node.data);
            let dst = copy.nodes.alloc(node.key, data)?;

            let dst_node = copy.nodes.get_mut(dst);
            dst_node.color = node.color;
            dst_node.parent = parent;
            match parent {
                None => copy.root = Some(dst),
                Some(p) if is_left => copy.nodes.get_mut(p).left = Some(dst),
                Some(p) => copy.nodes.get_mut(p).right = Some(dst),
            }

            if let Some(right) = node.right {
                stack.push((right, Some(dst), false));
            }
            if let Some(left) = node.left {
                stack.push((left, Some(dst), true));
            }
        }

        Ok(copy)
    }

    /// Copy only the nodes for which `pred(key, data)` holds.
    pub fn copy_if<F>(&self, mut pred: F) -> Result<Self, TreeError>
    where
        F: FnMut(Key, &T) -> bool,
    {
        let mut copy = Self::with_augmentation_and_config(self.aug.clone(), self.config);
        for (_, node) in self.iter() {
            if pred(node.key, &node.data) {
                copy.insert(node.key, self.aug.duplicate_node(&node.data))?;
            }
        }
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use crate::invariants::check_tree;
    use crate::rbtree::RbTree;
    use crate::types::{Key, TreeConfig, TreeError};
    use alloc::vec::Vec;

    fn pairs(tree: &RbTree<u64>) -> Vec<(Key, u64)> {
        tree.iter().map(|(_, n)| (n.key(), *n.data())).collect()
    }

    #[test]
    fn test_copy_preserves_shape() {
        let mut tree = RbTree::new();
        for key in [8u64, 4, 12, 2, 6, 10, 14, 1, 3] {
            tree.insert(key, key * 3).unwrap();
        }
        let copy = tree.copy().unwrap();
        assert!(check_tree(&copy).is_empty());
        assert_eq!(pairs(&copy), pairs(&tree));

        // Same colors along the same in-order sequence, same root key
        let colors = |t: &RbTree<u64>| t.iter().map(|(_, n)| n.color()).collect::<Vec<_>>();
        assert_eq!(colors(&copy), colors(&tree));
        assert_eq!(
            copy.nodes().key(copy.root().unwrap()),
            tree.nodes().key(tree.root().unwrap())
        );
    }

    #[test]
    fn test_copy_of_large_tree_matches_link_for_link() {
        let mut tree = RbTree::new();
        for key in 0..2048u64 {
            tree.insert(key * 7 % 2048, key).unwrap();
        }
        for key in (0..2048u64).step_by(3) {
            tree.delete_key(key);
        }
        let copy = tree.copy().unwrap();
        assert!(check_tree(&copy).is_empty());

        let links = |t: &RbTree<u64>| {
            t.iter()
                .map(|(_, n)| {
                    let key_of = |id| t.nodes().key(id);
                    (n.key(), n.color(), n.parent().map(key_of), n.left().map(key_of))
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(links(&copy), links(&tree));
    }

    #[test]
    fn test_copy_is_independent() {
        let mut tree = RbTree::new();
        for key in 0..16u64 {
            tree.insert(key, key).unwrap();
        }
        let mut copy = tree.copy().unwrap();
        copy.delete_key(5);
        *copy.get_mut(6).unwrap() = 600;

        assert_eq!(tree.len(), 16);
        assert_eq!(tree.get(5), Some(&5));
        assert_eq!(tree.get(6), Some(&6));
        assert_eq!(copy.len(), 15);
    }

    #[test]
    fn test_copy_if_filters_and_balances() {
        let mut tree = RbTree::new();
        for key in 0..100u64 {
            tree.insert(key, key).unwrap();
        }
        let evens = tree.copy_if(|key, _| key % 2 == 0).unwrap();
        assert!(check_tree(&evens).is_empty());
        assert_eq!(evens.len(), 50);
        assert!(evens.iter().all(|(_, n)| n.key() % 2 == 0));

        let none = tree.copy_if(|_, _| false).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_copy_keeps_config() {
        let mut tree = RbTree::with_config(TreeConfig::new().with_max_nodes(4));
        for key in 0..4u64 {
            tree.insert(key, key).unwrap();
        }
        let mut copy = tree.copy().unwrap();
        assert_eq!(copy.config().max_nodes, Some(4));
        assert_eq!(copy.insert(9, 9), Err(TreeError::OutOfMemory));

        let empty: RbTree<u64> = RbTree::new();
        assert!(empty.copy().unwrap().is_empty());
    }
}
