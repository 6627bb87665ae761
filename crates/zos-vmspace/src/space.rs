//! Address space region map
//!
//! Mappings never overlap, so the interval tree's overlap query doubles as
//! an address lookup: the mapping containing `addr` is the one overlapping
//! the point `[addr, addr]`.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Write;

use zos_itree::{
    Interval, IntervalEvents, IntervalNode, IntervalTree, InvariantViolation, IterOrder,
    TreeConfig,
};

use crate::error::VmError;
use crate::layout::VmLayout;
use crate::log::{VmEventType, VmLog};
use crate::mapping::{MappingKind, VmMapping, VmProt};

/// Tree event table that feeds the audit log.
#[derive(Clone, Debug, Default)]
pub struct VmEvents {
    log: VmLog,
}

impl VmEvents {
    pub fn log(&self) -> &VmLog {
        &self.log
    }
}

impl IntervalEvents<VmMapping> for VmEvents {
    fn copy_payload(&self, mapping: &VmMapping) -> Option<VmMapping> {
        Some(mapping.clone())
    }

    fn on_insert(&mut self, range: Interval, mapping: Option<&VmMapping>) {
        if let Some(mapping) = mapping {
            self.log.record(VmEventType::Mapped {
                range,
                kind: mapping.kind,
                prot: mapping.prot,
            });
        }
    }

    fn on_remove(&mut self, range: Interval, _mapping: Option<&VmMapping>) {
        self.log.record(VmEventType::Unmapped { range });
    }
}

/// The reserved ranges of one virtual address space.
pub struct AddressSpace {
    layout: VmLayout,
    regions: IntervalTree<VmMapping, VmEvents>,
}

impl AddressSpace {
    pub fn new(layout: VmLayout) -> Self {
        Self::with_config(layout, TreeConfig::new())
    }

    /// Create an address space holding at most `limit` mappings.
    pub fn with_node_limit(layout: VmLayout, limit: usize) -> Self {
        Self::with_config(layout, TreeConfig::new().with_max_nodes(limit))
    }

    fn with_config(layout: VmLayout, config: TreeConfig) -> Self {
        Self {
            layout,
            regions: IntervalTree::with_config(VmEvents::default(), config),
        }
    }

    pub fn layout(&self) -> &VmLayout {
        &self.layout
    }

    /// Audit trail of this space.
    pub fn log(&self) -> &VmLog {
        self.regions.events().log()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Reserve `[base, base + size)`.
    ///
    /// Base and size must be page-aligned, the range must lie inside the
    /// layout, and it must not touch any existing mapping.
    pub fn reserve(
        &mut self,
        base: u64,
        size: u64,
        name: &str,
        prot: VmProt,
        kind: MappingKind,
    ) -> Result<Interval, VmError> {
        let range = self.check_request(base, size)?;
        if let Some(existing) = self.regions.find_overlapping(range) {
            return Err(VmError::Overlap {
                existing: existing.interval(),
            });
        }

        let mapping = VmMapping {
            name: name.to_string(),
            base,
            size,
            prot,
            kind,
        };
        self.regions.insert(range, mapping)?;
        Ok(range)
    }

    /// Reserve the lowest free page-aligned range of `size` bytes at or
    /// above `hint` (the layout start when absent).
    pub fn reserve_range(
        &mut self,
        size: u64,
        hint: Option<u64>,
        name: &str,
        prot: VmProt,
        kind: MappingKind,
    ) -> Result<Interval, VmError> {
        if size == 0 {
            return Err(VmError::ZeroSize);
        }
        if !self.layout.is_aligned(size) {
            return Err(VmError::Unaligned { value: size });
        }

        let floor = hint.unwrap_or(self.layout.start).max(self.layout.start);
        let mut cursor = self
            .layout
            .align_up(floor)
            .ok_or(VmError::NoSpace { size })?;

        loop {
            let range = match Interval::from_base_size(cursor, size) {
                Some(range) if range.end <= self.layout.end => range,
                _ => return Err(VmError::NoSpace { size }),
            };

            // Skip past whatever is in the way; the cursor only moves up.
            match self.regions.find_overlapping(range) {
                None => return self.reserve(cursor, size, name, prot, kind),
                Some(blocker) => {
                    cursor = blocker
                        .interval()
                        .end
                        .checked_add(1)
                        .and_then(|next| self.layout.align_up(next))
                        .ok_or(VmError::NoSpace { size })?;
                }
            }
        }
    }

    /// Mapping containing `addr`.
    pub fn get_mapping(&self, addr: u64) -> Option<&VmMapping> {
        self.regions
            .find_overlapping(Interval::point(addr))
            .and_then(IntervalNode::payload)
    }

    /// Mapping containing `addr`, or a nearby one when `addr` is unmapped.
    pub fn nearest_mapping(&self, addr: u64) -> Option<&VmMapping> {
        self.regions
            .find_closest(Interval::point(addr))
            .and_then(IntervalNode::payload)
    }

    /// Release the mapping occupying exactly `range` and return it.
    ///
    /// A range that only partly covers a mapping, or spans several, removes
    /// nothing and reports `NotMapped(range.start)`.
    pub fn remove(&mut self, range: Interval) -> Result<VmMapping, VmError> {
        self.regions
            .delete(range)
            .and_then(|(_, mapping)| mapping)
            .ok_or(VmError::NotMapped(range.start))
    }

    /// Release the mapping that starts at `base` and return it.
    ///
    /// Mappings never overlap, so at most one starts at any address and the
    /// base alone identifies it.
    pub fn unmap(&mut self, base: u64) -> Result<VmMapping, VmError> {
        self.regions
            .delete_start(base)
            .and_then(|(_, mapping)| mapping)
            .ok_or(VmError::NotMapped(base))
    }

    /// Visit every mapping in address order (or reverse).
    pub fn for_each<F>(&self, order: IterOrder, f: F)
    where
        F: FnMut(&VmMapping),
    {
        match order {
            IterOrder::Forward => self
                .regions
                .iter()
                .filter_map(IntervalNode::payload)
                .for_each(f),
            IterOrder::Reverse => self
                .regions
                .iter_reverse()
                .filter_map(IntervalNode::payload)
                .for_each(f),
        }
    }

    /// Mappings intersecting `range`, in address order.
    pub fn mappings_in(&self, range: Interval) -> Vec<&VmMapping> {
        self.regions
            .find_all_overlapping(range)
            .into_iter()
            .filter_map(IntervalNode::payload)
            .collect()
    }

    /// Total bytes reserved.
    pub fn mapped_bytes(&self) -> u64 {
        self.regions
            .iter()
            .filter_map(IntervalNode::payload)
            .map(|m| m.size)
            .sum()
    }

    /// New address space holding copies of every inherited mapping.
    ///
    /// Kernel mappings stay behind. The child starts a fresh log whose first
    /// entry records the fork.
    pub fn fork(&self) -> Result<AddressSpace, VmError> {
        let mut regions = self.regions.copy_if(|node| {
            node.payload()
                .is_some_and(|mapping| mapping.kind.is_inherited())
        })?;

        let capacity = self.log().capacity();
        let inherited = regions.len();
        let events = regions.events_mut();
        events.log = VmLog::with_capacity(capacity);
        events.log.record(VmEventType::Forked {
            parent_mappings: self.len(),
            inherited,
        });

        Ok(AddressSpace {
            layout: self.layout,
            regions,
        })
    }

    /// Human-readable listing of every mapping.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "address space {}: {} mappings, {:#x} bytes",
            self.layout.span(),
            self.len(),
            self.mapped_bytes()
        );
        self.for_each(IterOrder::Forward, |m| {
            let _ = writeln!(
                out,
                "  {:#018x}-{:#018x} {} {:?} {}",
                m.base,
                m.end(),
                m.prot,
                m.kind,
                m.name
            );
        });
        out
    }

    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        self.regions.check_invariants()
    }

    fn check_request(&self, base: u64, size: u64) -> Result<Interval, VmError> {
        if size == 0 {
            return Err(VmError::ZeroSize);
        }
        if !self.layout.is_aligned(base) {
            return Err(VmError::Unaligned { value: base });
        }
        if !self.layout.is_aligned(size) {
            return Err(VmError::Unaligned { value: size });
        }
        match Interval::from_base_size(base, size) {
            Some(range) if self.layout.contains(range) => Ok(range),
            _ => Err(VmError::OutOfBounds { base, size }),
        }
    }
}
