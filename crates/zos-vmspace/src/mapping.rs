//! Mapping records

use alloc::string::String;
use core::fmt;
use serde::{Deserialize, Serialize};
use zos_itree::Interval;

/// Page protection of a mapping
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VmProt {
    /// Readable
    pub read: bool,
    /// Writable
    pub write: bool,
    /// Executable
    pub exec: bool,
    /// Accessible from user mode
    pub user: bool,
}

impl VmProt {
    /// Kernel read/write data
    pub fn kernel_rw() -> Self {
        Self {
            read: true,
            write: true,
            exec: false,
            user: false,
        }
    }

    /// User read/execute (code)
    pub fn user_rx() -> Self {
        Self {
            read: true,
            write: false,
            exec: true,
            user: true,
        }
    }

    /// User read/write (data, heap, stack)
    pub fn user_rw() -> Self {
        Self {
            read: true,
            write: true,
            exec: false,
            user: true,
        }
    }

    /// User read-only
    pub fn user_ro() -> Self {
        Self {
            read: true,
            write: false,
            exec: false,
            user: true,
        }
    }

    /// Convert to byte representation
    pub fn to_byte(&self) -> u8 {
        let mut b = 0u8;
        if self.read {
            b |= 0x01;
        }
        if self.write {
            b |= 0x02;
        }
        if self.exec {
            b |= 0x04;
        }
        if self.user {
            b |= 0x08;
        }
        b
    }

    /// Create from byte representation
    pub fn from_byte(b: u8) -> Self {
        Self {
            read: (b & 0x01) != 0,
            write: (b & 0x02) != 0,
            exec: (b & 0x04) != 0,
            user: (b & 0x08) != 0,
        }
    }
}

impl fmt::Display for VmProt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |on: bool, c: char| if on { c } else { '-' };
        write!(
            f,
            "{}{}{}{}",
            flag(self.read, 'r'),
            flag(self.write, 'w'),
            flag(self.exec, 'x'),
            flag(self.user, 'u')
        )
    }
}

/// What a mapping is used for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingKind {
    /// Kernel-owned region; never inherited by a forked space
    Kernel,
    /// Program text
    Code,
    /// Initialized or zeroed program data
    Data,
    Heap,
    Stack,
    /// Device MMIO window
    Device,
    /// Memory shared with another address space
    Shared,
}

impl MappingKind {
    /// Whether a forked address space inherits mappings of this kind.
    pub fn is_inherited(self) -> bool {
        !matches!(self, MappingKind::Kernel)
    }
}

/// One reserved virtual range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmMapping {
    /// Human-readable label
    pub name: String,
    /// First address
    pub base: u64,
    /// Length in bytes (a multiple of the page size)
    pub size: u64,
    pub prot: VmProt,
    pub kind: MappingKind,
}

impl VmMapping {
    /// Last address covered (inclusive).
    pub fn end(&self) -> u64 {
        self.base + (self.size - 1)
    }

    pub fn range(&self) -> Interval {
        Interval::new(self.base, self.end())
    }

    pub fn contains(&self, addr: u64) -> bool {
        self.range().contains(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_prot_byte_roundtrip() {
        for prot in [
            VmProt::kernel_rw(),
            VmProt::user_rx(),
            VmProt::user_rw(),
            VmProt::user_ro(),
            VmProt::default(),
        ] {
            assert_eq!(VmProt::from_byte(prot.to_byte()), prot);
        }
    }

    #[test]
    fn test_prot_display() {
        assert_eq!(VmProt::user_rx().to_string(), "r-xu");
        assert_eq!(VmProt::kernel_rw().to_string(), "rw--");
        assert_eq!(VmProt::default().to_string(), "----");
    }

    #[test]
    fn test_mapping_range() {
        let mapping = VmMapping {
            name: "stack".to_string(),
            base: 0x7000,
            size: 0x2000,
            prot: VmProt::user_rw(),
            kind: MappingKind::Stack,
        };
        assert_eq!(mapping.end(), 0x8fff);
        assert_eq!(mapping.range(), Interval::new(0x7000, 0x8fff));
        assert!(mapping.contains(0x8fff));
        assert!(!mapping.contains(0x9000));
    }

    #[test]
    fn test_kernel_kind_not_inherited() {
        assert!(!MappingKind::Kernel.is_inherited());
        assert!(MappingKind::Heap.is_inherited());
        assert!(MappingKind::Shared.is_inherited());
    }
}
