//! Address Space Event Log (VmLog)
//!
//! Records every mapping change of one address space for audit. Entries are
//! append-only with monotonic IDs; the oldest are dropped once the log
//! exceeds its capacity.

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use zos_itree::Interval;

use crate::mapping::{MappingKind, VmProt};

/// Monotonic event identifier.
pub type EventId = u64;

/// An address space event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmEvent {
    /// Unique event ID (monotonic)
    pub id: EventId,
    /// What happened
    pub event_type: VmEventType,
}

/// Type of address space event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VmEventType {
    /// A range was reserved
    Mapped {
        range: Interval,
        kind: MappingKind,
        prot: VmProt,
    },
    /// A range was released
    Unmapped { range: Interval },
    /// This space was created by forking another one
    Forked {
        /// Mappings in the parent
        parent_mappings: usize,
        /// Mappings carried into this space
        inherited: usize,
    },
}

/// Maximum number of events to keep in memory
pub const MAX_VMLOG_EVENTS: usize = 4096;

/// Audit log of one address space.
#[derive(Clone, Debug)]
pub struct VmLog {
    /// Event entries (append-only)
    events: Vec<VmEvent>,
    /// Next event ID to assign
    next_id: EventId,
    /// Retained events before trimming
    capacity: usize,
}

impl VmLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self::with_capacity(MAX_VMLOG_EVENTS)
    }

    /// Create a log that keeps at most `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            next_id: 0,
            capacity,
        }
    }

    /// Append an event and return its ID.
    pub fn record(&mut self, event_type: VmEventType) -> EventId {
        let id = self.next_id;
        self.next_id += 1;

        self.events.push(VmEvent { id, event_type });

        self.trim_if_needed();
        id
    }

    /// Get all retained events.
    pub fn events(&self) -> &[VmEvent] {
        &self.events
    }

    /// Get events in a sequence range.
    pub fn get_range(&self, start_id: EventId, end_id: EventId) -> Vec<&VmEvent> {
        self.events
            .iter()
            .filter(|e| e.id >= start_id && e.id < end_id)
            .collect()
    }

    /// Get the most recent N events, newest first.
    pub fn get_recent(&self, count: usize) -> Vec<&VmEvent> {
        self.events.iter().rev().take(count).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn next_id(&self) -> EventId {
        self.next_id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Trim old events if exceeding capacity.
    fn trim_if_needed(&mut self) {
        if self.events.len() > self.capacity {
            let drain_count = self.events.len() - self.capacity;
            self.events.drain(0..drain_count);
        }
    }
}

impl Default for VmLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unmapped(start: u64) -> VmEventType {
        VmEventType::Unmapped {
            range: Interval::new(start, start + 0xfff),
        }
    }

    #[test]
    fn test_vmlog_creation() {
        let log = VmLog::new();
        assert!(log.is_empty());
        assert_eq!(log.next_id(), 0);
        assert_eq!(log.capacity(), MAX_VMLOG_EVENTS);
    }

    #[test]
    fn test_vmlog_record() {
        let mut log = VmLog::new();
        let id = log.record(VmEventType::Mapped {
            range: Interval::new(0x1000, 0x1fff),
            kind: MappingKind::Code,
            prot: VmProt::user_rx(),
        });
        assert_eq!(id, 0);
        assert_eq!(log.record(unmapped(0x1000)), 1);

        let events = log.events();
        assert!(matches!(
            events[0].event_type,
            VmEventType::Mapped {
                kind: MappingKind::Code,
                ..
            }
        ));
        assert_eq!(events[1].event_type, unmapped(0x1000));
    }

    #[test]
    fn test_vmlog_get_recent_and_range() {
        let mut log = VmLog::new();
        for i in 0..10 {
            log.record(unmapped(i * 0x1000));
        }

        let recent = log.get_recent(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].id, 9);
        assert_eq!(recent[2].id, 7);

        let range = log.get_range(3, 7);
        assert_eq!(range.len(), 4);
        assert_eq!(range[0].id, 3);
        assert_eq!(range[3].id, 6);
    }

    #[test]
    fn test_vmlog_trims_oldest() {
        let mut log = VmLog::with_capacity(4);
        for i in 0..10 {
            log.record(unmapped(i * 0x1000));
        }
        assert_eq!(log.len(), 4);
        assert_eq!(log.events()[0].id, 6);
        assert_eq!(log.next_id(), 10);
    }
}
