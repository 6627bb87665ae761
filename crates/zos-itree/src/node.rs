//! Node records and the arena that owns them
//!
//! Every node lives in a slot of `NodeArena`. Links between nodes are
//! `Option<NodeId>` indices, so the arena is the only owner and a rotation
//! is a handful of index writes. Freed slots go on a free list and are
//! reused by later insertions. Each slot carries a generation that moves on
//! when the slot is freed, so a `NodeId` names one occupancy only: once its
//! node is deleted the id stays dead even after the slot is reused.
//!
//! Touching a dead id is a contract violation and panics.

use alloc::vec::Vec;

use crate::types::{Color, Key, NodeId, TreeConfig, TreeError};

/// A red-black tree node.
#[derive(Clone, Debug)]
pub struct Node<T> {
    pub(crate) key: Key,
    pub(crate) color: Color,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) data: T,
}

impl<T> Node<T> {
    fn new(key: Key, data: T) -> Self {
        Self {
            key,
            color: Color::Red,
            parent: None,
            left: None,
            right: None,
            data,
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    pub fn data(&self) -> &T {
        &self.data
    }
}

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

impl<T> Slot<T> {
    fn holds(&self, id: NodeId) -> bool {
        self.generation == id.generation() && self.node.is_some()
    }
}

/// Slot arena owning all nodes of one tree.
#[derive(Clone, Debug)]
pub struct NodeArena<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    live: usize,
    max_nodes: Option<usize>,
}

impl<T> NodeArena<T> {
    pub fn new() -> Self {
        Self::with_config(&TreeConfig::new())
    }

    pub fn with_config(config: &TreeConfig) -> Self {
        let mut slots = Vec::new();
        // Best effort: a failed reservation only means the arena grows lazily.
        let _ = slots.try_reserve(config.initial_capacity);
        Self {
            slots,
            free_list: Vec::new(),
            live: 0,
            max_nodes: config.max_nodes,
        }
    }

    /// Allocate a detached red node holding `data`.
    ///
    /// Fails without side effects when the node limit is reached or the
    /// backing storage cannot grow.
    pub(crate) fn alloc(&mut self, key: Key, data: T) -> Result<NodeId, TreeError> {
        if let Some(max) = self.max_nodes {
            if self.live >= max {
                return Err(TreeError::OutOfMemory);
            }
        }

        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.node = Some(Node::new(key, data));
            self.live += 1;
            return Ok(NodeId::new(idx, slot.generation));
        }

        let idx = u32::try_from(self.slots.len()).map_err(|_| TreeError::OutOfMemory)?;
        self.slots
            .try_reserve(1)
            .map_err(|_| TreeError::OutOfMemory)?;
        // Release never allocates: the free list can already hold every slot.
        self.free_list
            .try_reserve(self.slots.len() + 1)
            .map_err(|_| TreeError::OutOfMemory)?;
        self.slots.push(Slot {
            generation: 0,
            node: Some(Node::new(key, data)),
        });
        self.live += 1;
        Ok(NodeId::new(idx, 0))
    }

    /// Release a slot and hand back the node it held.
    pub(crate) fn release(&mut self, id: NodeId) -> Node<T> {
        let slot = match self.slots.get_mut(id.index()) {
            Some(slot) if slot.holds(id) => slot,
            _ => dead_node(id),
        };
        let Some(node) = slot.node.take() else {
            dead_node(id)
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index() as u32);
        self.live -= 1;
        node
    }

    /// Drop every node. Slots are kept and retired so that ids issued
    /// before the clear stay dead.
    pub(crate) fn clear(&mut self) {
        self.free_list.clear();
        for (idx, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            // Slot indices always fit in u32; alloc refuses to grow past that.
            self.free_list.push(idx as u32);
        }
        self.live = 0;
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Configured node limit.
    pub fn max_nodes(&self) -> Option<usize> {
        self.max_nodes
    }

    /// Whether `id` names a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.get(id.index()).is_some_and(|slot| slot.holds(id))
    }

    pub fn try_get(&self, id: NodeId) -> Option<&Node<T>> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get(&self, id: NodeId) -> &Node<T> {
        match self.try_get(id) {
            Some(node) => node,
            None => dead_node(id),
        }
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node<T> {
        match self.slots.get_mut(id.index()) {
            Some(Slot {
                generation,
                node: Some(node),
            }) if *generation == id.generation() => node,
            _ => dead_node(id),
        }
    }

    pub fn key(&self, id: NodeId) -> Key {
        self.get(id).key
    }

    pub fn color(&self, id: NodeId) -> Color {
        self.get(id).color
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).left
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).right
    }

    pub fn data(&self, id: NodeId) -> &T {
        &self.get(id).data
    }

    /// Mutable access to a node's data. Links stay private to the core.
    pub fn data_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.get_mut(id).data
    }

    /// Ids of all live slots in slot order.
    pub fn live_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.node.is_some())
            .map(|(idx, slot)| NodeId::new(idx as u32, slot.generation))
    }
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cold]
#[inline(never)]
fn dead_node(id: NodeId) -> ! {
    panic!("zos-itree: node {} is not live in this tree", id)
}
