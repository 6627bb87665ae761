//! Error Types for Address Space Operations

use core::fmt;
use zos_itree::{Interval, TreeError};

/// Errors returned by `AddressSpace`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VmError {
    /// Zero-length request
    ZeroSize,

    /// Base or size is not a multiple of the page size
    Unaligned { value: u64 },

    /// Range leaves the layout (or wraps the address space)
    OutOfBounds { base: u64, size: u64 },

    /// Range intersects an existing mapping
    Overlap { existing: Interval },

    /// No mapping starts at this address
    NotMapped(u64),

    /// No free range of this size is left
    NoSpace { size: u64 },

    /// The region map could not grow
    Tree(TreeError),
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::ZeroSize => write!(f, "Zero-sized mapping"),
            VmError::Unaligned { value } => write!(f, "Unaligned address or size: {:#x}", value),
            VmError::OutOfBounds { base, size } => {
                write!(f, "Range {:#x}+{:#x} is outside the address space", base, size)
            }
            VmError::Overlap { existing } => write!(f, "Overlaps existing mapping {}", existing),
            VmError::NotMapped(addr) => write!(f, "No mapping at {:#x}", addr),
            VmError::NoSpace { size } => write!(f, "No free range of {:#x} bytes", size),
            VmError::Tree(e) => write!(f, "Region map error: {}", e),
        }
    }
}

impl From<TreeError> for VmError {
    fn from(e: TreeError) -> Self {
        VmError::Tree(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_display() {
        assert_eq!(VmError::NotMapped(0x1000).to_string(), "No mapping at 0x1000");
        assert_eq!(
            VmError::Overlap {
                existing: Interval::new(0x1000, 0x1fff)
            }
            .to_string(),
            "Overlaps existing mapping [0x1000, 0x1fff]"
        );
    }

    #[test]
    fn test_from_tree_error() {
        let e: VmError = TreeError::OutOfMemory.into();
        assert_eq!(e, VmError::Tree(TreeError::OutOfMemory));
    }
}
