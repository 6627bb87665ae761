//! Core tree types
//!
//! Plain data shared by the red-black core and the interval layer.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Ordered key stored in every node.
pub type Key = u64;

/// Handle to a node slot in the arena.
///
/// The generation changes every time the slot is freed, so a handle kept
/// past the deletion of its node never names the slot's next occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the arena's backing vector.
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Occupancy count of the slot when this handle was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Node color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    Red,
    Black,
}

/// Direction of an in-order walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IterOrder {
    /// Ascending key order
    Forward,
    /// Descending key order
    Reverse,
}

/// A closed range `[start, end]`.
///
/// `start <= end` is a caller contract. The tree does not check it; storing a
/// reversed interval makes overlap results meaningless.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// First value in the range
    pub start: u64,
    /// Last value in the range (inclusive)
    pub end: u64,
}

impl Interval {
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// The single-value interval `[value, value]`.
    pub const fn point(value: u64) -> Self {
        Self {
            start: value,
            end: value,
        }
    }

    /// Build `[base, base + size - 1]`. Returns `None` for an empty or
    /// overflowing range.
    pub fn from_base_size(base: u64, size: u64) -> Option<Self> {
        if size == 0 {
            return None;
        }
        let end = base.checked_add(size - 1)?;
        Some(Self { start: base, end })
    }

    /// Two intervals overlap if neither lies entirely before the other.
    pub const fn overlaps(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Whether `value` lies inside the interval.
    pub const fn contains(&self, value: u64) -> bool {
        self.start <= value && value <= self.end
    }

    /// Number of values covered, saturating at `u64::MAX` for the full range.
    pub const fn len(&self) -> u64 {
        self.end.saturating_sub(self.start).saturating_add(1)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#x}, {:#x}]", self.start, self.end)
    }
}

/// Errors returned by tree mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// The node store could not provide another node
    OutOfMemory,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::OutOfMemory => write!(f, "Out of memory: node allocation failed"),
        }
    }
}

/// Default number of slots reserved up front by a new tree.
pub const DEFAULT_INITIAL_CAPACITY: usize = 0;

/// Node store configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeConfig {
    /// Maximum number of live nodes, `None` for no limit beyond the heap
    pub max_nodes: Option<usize>,
    /// Slots reserved when the tree is created
    pub initial_capacity: usize,
}

impl TreeConfig {
    pub const fn new() -> Self {
        Self {
            max_nodes: None,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }

    /// Cap the number of live nodes.
    pub const fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub const fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_is_closed() {
        let a = Interval::new(1, 5);
        assert!(a.overlaps(&Interval::new(5, 9)));
        assert!(a.overlaps(&Interval::new(0, 1)));
        assert!(a.overlaps(&Interval::point(3)));
        assert!(!a.overlaps(&Interval::new(6, 9)));
        assert!(!Interval::new(10, 15).overlaps(&a));
    }

    #[test]
    fn test_from_base_size() {
        assert_eq!(
            Interval::from_base_size(0x1000, 0x1000),
            Some(Interval::new(0x1000, 0x1fff))
        );
        assert_eq!(Interval::from_base_size(0x1000, 0), None);
        assert_eq!(Interval::from_base_size(u64::MAX, 2), None);
    }

    #[test]
    fn test_interval_len() {
        assert_eq!(Interval::point(7).len(), 1);
        assert_eq!(Interval::new(0, u64::MAX).len(), u64::MAX);
        assert!(Interval::new(4, 9).contains(9));
        assert!(!Interval::new(4, 9).contains(10));
    }

    #[test]
    fn test_config_builder() {
        let config = TreeConfig::new().with_max_nodes(8).with_initial_capacity(4);
        assert_eq!(config.max_nodes, Some(8));
        assert_eq!(config.initial_capacity, 4);
        assert_eq!(TreeConfig::default().max_nodes, None);
    }
}

#[cfg(kani)]
mod proofs {
    use super::*;

    /// Proof: overlap is symmetric
    #[kani::proof]
    fn overlap_symmetric() {
        let a = Interval::new(kani::any(), kani::any());
        let b = Interval::new(kani::any(), kani::any());
        kani::assert(
            a.overlaps(&b) == b.overlaps(&a),
            "Overlap must not depend on argument order",
        );
    }

    /// Proof: a point overlaps an interval iff the interval contains it
    #[kani::proof]
    fn point_overlap_matches_contains() {
        let start: u64 = kani::any();
        let end: u64 = kani::any();
        kani::assume(start <= end);
        let value: u64 = kani::any();
        let interval = Interval::new(start, end);
        kani::assert(
            interval.overlaps(&Interval::point(value)) == interval.contains(value),
            "Point overlap must agree with containment",
        );
    }
}
