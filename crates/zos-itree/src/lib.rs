//! Zero OS Interval Tree - Augmented Red-Black Tree for Range Bookkeeping
//!
//! This crate contains the balanced search tree that the kernel uses to track
//! address ranges (virtual memory regions, reserved resource windows). It is
//! split into a generic red-black core and an augmentation layer that keeps a
//! per-node summary of the subtree consistent under every structural change.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      IntervalTree<P, E>                     │
//! │        insert / delete / find_overlapping / find_closest    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ keyed by interval.start
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        RbTree<T, A>                         │
//! │   ┌───────────────┐    ┌───────────────┐                    │
//! │   │   NodeArena   │    │  rotate/fixup │───▶ A: TreeAugmentation
//! │   │  NodeId slots │    │  insert/delete│     (IntervalAugment keeps
//! │   └───────────────┘    └───────────────┘      subtree min/max)
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Ownership
//!
//! - The arena is the sole owner of every node; links are `Option<NodeId>`.
//! - Deleting a node moves its data out and hands it back to the caller.
//! - Iterators borrow the tree, so the tree cannot change under a cursor.
//!
//! # Module Organization
//!
//! - `types` - Keys, node ids, colors, intervals, errors, configuration
//! - `node` - Node records and the arena that owns them
//! - `augment` - The `TreeAugmentation` event trait
//! - `rbtree` - Red-black core: balancing, iteration, duplication
//! - `interval` - Interval payload wrapper, augmentation and query logic
//! - `invariants` - Runtime-checkable structural and summary invariants

#![no_std]
extern crate alloc;

pub mod augment;
pub mod interval;
pub mod invariants;
pub mod node;
pub mod rbtree;
pub mod types;

pub use augment::{NoAugmentation, TreeAugmentation};
pub use interval::{
    ClonePayloads, IntervalAugment, IntervalEvents, IntervalNode, IntervalTree, NoEvents,
};
pub use invariants::{assert_tree, check_interval_tree, check_tree, InvariantViolation};
pub use node::{Node, NodeArena};
pub use rbtree::{Iter, RbTree};
pub use types::{Color, Interval, IterOrder, Key, NodeId, TreeConfig, TreeError};
