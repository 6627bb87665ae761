//! Rotations, transplant and the two rebalancing procedures.

use super::RbTree;
use crate::augment::TreeAugmentation;
use crate::types::{Color, NodeId};

impl<T, A: TreeAugmentation<T>> RbTree<T, A> {
    /// Rotate `x` down to the left; its right child takes its place.
    pub(crate) fn rotate_left(&mut self, x: NodeId) {
        let y = expect_node(self.nodes.right(x));
        self.aug.pre_rotate(&mut self.nodes, x, y);

        let inner = self.nodes.left(y);
        self.nodes.get_mut(x).right = inner;
        if let Some(inner) = inner {
            self.nodes.get_mut(inner).parent = Some(x);
        }

        let parent = self.nodes.parent(x);
        self.nodes.get_mut(y).parent = parent;
        self.replace_child(parent, x, Some(y));

        self.nodes.get_mut(y).left = Some(x);
        self.nodes.get_mut(x).parent = Some(y);

        self.aug.post_rotate(&mut self.nodes, x, y);
    }

    /// Rotate `x` down to the right; its left child takes its place.
    pub(crate) fn rotate_right(&mut self, x: NodeId) {
        let y = expect_node(self.nodes.left(x));
        self.aug.pre_rotate(&mut self.nodes, x, y);

        let inner = self.nodes.right(y);
        self.nodes.get_mut(x).left = inner;
        if let Some(inner) = inner {
            self.nodes.get_mut(inner).parent = Some(x);
        }

        let parent = self.nodes.parent(x);
        self.nodes.get_mut(y).parent = parent;
        self.replace_child(parent, x, Some(y));

        self.nodes.get_mut(y).right = Some(x);
        self.nodes.get_mut(x).parent = Some(y);

        self.aug.post_rotate(&mut self.nodes, x, y);
    }

    /// Point `parent`'s link to `old` at `new` instead (or the root link
    /// when `parent` is absent).
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let node = self.nodes.get_mut(p);
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    node.right = new;
                }
            }
        }
    }

    /// Put `v` where `u` hangs. `u`'s own links are left untouched.
    pub(crate) fn transplant(&mut self, u: NodeId, v: Option<NodeId>) {
        let parent = self.nodes.parent(u);
        self.replace_child(parent, u, v);
        if let Some(v) = v {
            self.nodes.get_mut(v).parent = parent;
        }
        self.aug.replace_node(&mut self.nodes, u, v);
    }

    fn set_color(&mut self, id: NodeId, color: Color) {
        self.nodes.get_mut(id).color = color;
    }

    pub(crate) fn insert_fixup(&mut self, mut z: NodeId) {
        while let Some(p) = self.nodes.parent(z) {
            if self.nodes.color(p) == Color::Black {
                break;
            }
            // A red node is never the root, so its parent exists.
            let g = expect_node(self.nodes.parent(p));

            if self.nodes.left(g) == Some(p) {
                let uncle = self.nodes.right(g);
                if self.color_of(uncle) == Color::Red {
                    self.set_color(p, Color::Black);
                    self.set_color(expect_node(uncle), Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    let mut top = p;
                    if self.nodes.right(p) == Some(z) {
                        self.rotate_left(p);
                        top = z;
                        z = p;
                    }
                    self.set_color(top, Color::Black);
                    self.set_color(g, Color::Red);
                    self.rotate_right(g);
                }
            } else {
                let uncle = self.nodes.left(g);
                if self.color_of(uncle) == Color::Red {
                    self.set_color(p, Color::Black);
                    self.set_color(expect_node(uncle), Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    let mut top = p;
                    if self.nodes.left(p) == Some(z) {
                        self.rotate_right(p);
                        top = z;
                        z = p;
                    }
                    self.set_color(top, Color::Black);
                    self.set_color(g, Color::Red);
                    self.rotate_left(g);
                }
            }
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    /// Restore balance after a black node was spliced out above `x`.
    ///
    /// `x` may be absent, so its parent is tracked separately.
    pub(crate) fn delete_fixup(&mut self, mut x: Option<NodeId>, mut parent: Option<NodeId>) {
        while x != self.root && self.color_of(x) == Color::Black {
            let p = match parent {
                Some(p) => p,
                None => break,
            };

            if self.nodes.left(p) == x {
                // x is one black short, so its sibling cannot be absent.
                let mut w = expect_node(self.nodes.right(p));
                if self.nodes.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_left(p);
                    w = expect_node(self.nodes.right(p));
                }

                let w_left = self.nodes.left(w);
                let w_right = self.nodes.right(w);
                if self.color_of(w_left) == Color::Black && self.color_of(w_right) == Color::Black {
                    self.set_color(w, Color::Red);
                    x = Some(p);
                    parent = self.nodes.parent(p);
                } else {
                    if self.color_of(w_right) == Color::Black {
                        self.set_color(expect_node(w_left), Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate_right(w);
                        w = expect_node(self.nodes.right(p));
                    }
                    let p_color = self.nodes.color(p);
                    self.set_color(w, p_color);
                    self.set_color(p, Color::Black);
                    if let Some(w_right) = self.nodes.right(w) {
                        self.set_color(w_right, Color::Black);
                    }
                    self.rotate_left(p);
                    x = self.root;
                    parent = None;
                }
            } else {
                let mut w = expect_node(self.nodes.left(p));
                if self.nodes.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_right(p);
                    w = expect_node(self.nodes.left(p));
                }

                let w_left = self.nodes.left(w);
                let w_right = self.nodes.right(w);
                if self.color_of(w_left) == Color::Black && self.color_of(w_right) == Color::Black {
                    self.set_color(w, Color::Red);
                    x = Some(p);
                    parent = self.nodes.parent(p);
                } else {
                    if self.color_of(w_left) == Color::Black {
                        self.set_color(expect_node(w_right), Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate_left(w);
                        w = expect_node(self.nodes.left(p));
                    }
                    let p_color = self.nodes.color(p);
                    self.set_color(w, p_color);
                    self.set_color(p, Color::Black);
                    if let Some(w_left) = self.nodes.left(w) {
                        self.set_color(w_left, Color::Black);
                    }
                    self.rotate_right(p);
                    x = self.root;
                    parent = None;
                }
            }
        }

        if let Some(x) = x {
            self.set_color(x, Color::Black);
        }
    }
}

/// Unwrap a link the red-black invariants guarantee to be present.
#[track_caller]
fn expect_node(id: Option<NodeId>) -> NodeId {
    match id {
        Some(id) => id,
        None => panic!("zos-itree: red-black invariant violated (missing node)"),
    }
}
