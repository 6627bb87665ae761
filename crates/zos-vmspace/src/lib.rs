//! Zero OS Virtual Address Space - Region Map on the Interval Tree
//!
//! This crate tracks which virtual address ranges of one address space are
//! reserved, with what protection and for what purpose. It is the kernel's
//! consumer of `zos-itree`: every mapping is one closed interval in an
//! `IntervalTree`, so overlap checks, address lookups and free-range search
//! are all logarithmic.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       AddressSpace                          │
//! │   reserve / reserve_range / unmap / get_mapping / fork      │
//! │                                                             │
//! │   ┌───────────────┐    ┌───────────────┐                    │
//! │   │   VmLayout    │    │     VmLog     │◀── VmEvents        │
//! │   │ bounds, pages │    │  audit trail  │    (tree events)   │
//! │   └───────────────┘    └───────────────┘                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │             IntervalTree<VmMapping, VmEvents>               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! - `layout` - Address space bounds and page size presets
//! - `mapping` - Mapping records, protection bits and kinds
//! - `error` - Error type for address space operations
//! - `log` - Append-only audit log of mapping changes
//! - `space` - The `AddressSpace` itself

#![no_std]
extern crate alloc;

pub mod error;
pub mod layout;
pub mod log;
pub mod mapping;
pub mod space;

pub use error::VmError;
pub use layout::{VmLayout, PAGE_SIZE};
pub use log::{EventId, VmEvent, VmEventType, VmLog};
pub use mapping::{MappingKind, VmMapping, VmProt};
pub use space::{AddressSpace, VmEvents};

pub use zos_itree::{Interval, IterOrder, TreeError};
