//! Subtree min/max maintenance for the interval tree.

use super::IntervalNode;
use crate::augment::TreeAugmentation;
use crate::node::NodeArena;
use crate::types::{Interval, NodeId};

/// Caller-visible event table of an `IntervalTree`.
///
/// Every hook has a no-op default. `copy_payload` is the payload cloner used
/// when a tree is duplicated: returning `None` (the default) makes the copy
/// hold no payload for that interval.
pub trait IntervalEvents<P> {
    /// Clone a payload into a duplicated tree.
    fn copy_payload(&self, _payload: &P) -> Option<P> {
        None
    }

    /// An interval was inserted (after rebalancing).
    fn on_insert(&mut self, _interval: Interval, _payload: Option<&P>) {}

    /// An interval was removed. The payload is about to be handed back to
    /// the caller of `delete`.
    fn on_remove(&mut self, _interval: Interval, _payload: Option<&P>) {}
}

/// Event table with no hooks. Copies made with it carry no payloads.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEvents;

impl<P> IntervalEvents<P> for NoEvents {}

/// Event table whose only hook clones payloads on copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClonePayloads;

impl<P: Clone> IntervalEvents<P> for ClonePayloads {
    fn copy_payload(&self, payload: &P) -> Option<P> {
        Some(payload.clone())
    }
}

/// The augmentation registered on the red-black core of an `IntervalTree`.
#[derive(Clone, Debug, Default)]
pub struct IntervalAugment<E> {
    pub(crate) events: E,
}

impl<E> IntervalAugment<E> {
    pub fn new(events: E) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &E {
        &self.events
    }
}

/// Recompute `{min, max}` from `id` up to the root.
pub(crate) fn recalculate<P>(nodes: &mut NodeArena<IntervalNode<P>>, mut id: Option<NodeId>) {
    while let Some(x) = id {
        let (mut min, mut max) = {
            let data = nodes.data(x);
            (data.interval.start, data.interval.end)
        };
        for child in [nodes.left(x), nodes.right(x)].into_iter().flatten() {
            let data = nodes.data(child);
            min = min.min(data.min);
            max = max.max(data.max);
        }

        let data = nodes.data_mut(x);
        data.min = min;
        data.max = max;
        id = nodes.parent(x);
    }
}

fn copy_summary<P>(nodes: &mut NodeArena<IntervalNode<P>>, from: NodeId, to: NodeId) {
    let (min, max) = {
        let data = nodes.data(from);
        (data.min, data.max)
    };
    let data = nodes.data_mut(to);
    data.min = min;
    data.max = max;
}

impl<P, E: IntervalEvents<P>> TreeAugmentation<IntervalNode<P>> for IntervalAugment<E> {
    fn post_rotate(&mut self, nodes: &mut NodeArena<IntervalNode<P>>, x: NodeId, y: NodeId) {
        // y now covers exactly the nodes x covered before the rotation
        copy_summary(nodes, x, y);
        recalculate(nodes, Some(x));
    }

    fn pre_insert(&mut self, nodes: &mut NodeArena<IntervalNode<P>>, z: NodeId) {
        let data = nodes.data_mut(z);
        data.min = data.interval.start;
        data.max = data.interval.end;
    }

    fn post_insert(&mut self, nodes: &mut NodeArena<IntervalNode<P>>, z: NodeId) {
        recalculate(nodes, Some(z));
        let data = nodes.data(z);
        self.events.on_insert(data.interval, data.payload.as_ref());
    }

    fn post_delete(
        &mut self,
        nodes: &mut NodeArena<IntervalNode<P>>,
        removed: &IntervalNode<P>,
        x: Option<NodeId>,
        x_parent: Option<NodeId>,
    ) {
        // Stale summaries only remain on the path above the spliced slot.
        recalculate(nodes, x.or(x_parent));
        self.events
            .on_remove(removed.interval, removed.payload.as_ref());
    }

    fn replace_node(
        &mut self,
        nodes: &mut NodeArena<IntervalNode<P>>,
        u: NodeId,
        v: Option<NodeId>,
    ) {
        if let Some(v) = v {
            copy_summary(nodes, u, v);
        }
    }

    fn duplicate_node(&self, data: &IntervalNode<P>) -> IntervalNode<P> {
        IntervalNode {
            interval: data.interval,
            min: data.min,
            max: data.max,
            payload: data
                .payload
                .as_ref()
                .and_then(|payload| self.events.copy_payload(payload)),
        }
    }
}
