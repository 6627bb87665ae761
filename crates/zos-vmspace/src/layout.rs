//! Virtual address layout
//!
//! Assumed x86_64 layout:
//!
//! ```text
//!   0x0000_1000_0000_0000 ..= 0x0000_107f_ffff_ffff
//!     - user slot (PML4 index 32, 512GiB), private to each process
//!
//!   0xffff_8000_0000_0000 ..= 0xffff_ffff_ffff_ffff
//!     - kernel space (canonical high half), shared by every task
//! ```

use serde::{Deserialize, Serialize};
use zos_itree::Interval;

/// Smallest mapping granule.
pub const PAGE_SIZE: u64 = 0x1000;

/// Virtual range covered by one PML4 entry (512GiB).
pub const PML4_SLOT_SIZE: u64 = 1u64 << 39;

/// PML4 index reserved for user mappings.
pub const USER_PML4_INDEX: u64 = 32;

/// First address of the user slot.
pub const USER_SPACE_START: u64 = USER_PML4_INDEX * PML4_SLOT_SIZE;

/// Last address of the user slot.
pub const USER_SPACE_END: u64 = USER_SPACE_START + (PML4_SLOT_SIZE - 1);

/// First address of the kernel half.
pub const KERNEL_SPACE_START: u64 = 0xffff_8000_0000_0000;

/// Last address of the kernel half.
pub const KERNEL_SPACE_END: u64 = u64::MAX;

/// Bounds and granule of one address space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmLayout {
    /// First usable address
    pub start: u64,
    /// Last usable address (inclusive)
    pub end: u64,
    /// Alignment of every mapping base and size (a power of two)
    pub page_size: u64,
}

impl VmLayout {
    /// # Panics
    ///
    /// Panics if `page_size` is not a power of two.
    pub const fn new(start: u64, end: u64, page_size: u64) -> Self {
        assert!(page_size.is_power_of_two(), "page size must be a power of two");
        Self {
            start,
            end,
            page_size,
        }
    }

    /// The per-process user slot.
    pub const fn user() -> Self {
        Self::new(USER_SPACE_START, USER_SPACE_END, PAGE_SIZE)
    }

    /// The shared kernel half.
    pub const fn kernel() -> Self {
        Self::new(KERNEL_SPACE_START, KERNEL_SPACE_END, PAGE_SIZE)
    }

    pub fn span(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    /// Whether all of `range` lies inside the layout.
    pub fn contains(&self, range: Interval) -> bool {
        range.start >= self.start && range.end <= self.end
    }

    pub fn is_aligned(&self, value: u64) -> bool {
        value & (self.page_size - 1) == 0
    }

    /// Round `value` up to the next page boundary. `None` on overflow.
    pub fn align_up(&self, value: u64) -> Option<u64> {
        let mask = self.page_size - 1;
        value.checked_add(mask).map(|v| v & !mask)
    }
}

impl Default for VmLayout {
    fn default() -> Self {
        Self::user()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let user = VmLayout::user();
        assert_eq!(user.start, 0x0000_1000_0000_0000);
        assert_eq!(user.end, 0x0000_107f_ffff_ffff);
        assert_eq!(VmLayout::default(), user);

        let kernel = VmLayout::kernel();
        assert!(kernel.contains(Interval::new(KERNEL_SPACE_START, u64::MAX)));
        assert!(!kernel.contains(user.span()));
    }

    #[test]
    fn test_alignment() {
        let layout = VmLayout::user();
        assert!(layout.is_aligned(0x2000));
        assert!(!layout.is_aligned(0x2001));
        assert_eq!(layout.align_up(0x2001), Some(0x3000));
        assert_eq!(layout.align_up(0x3000), Some(0x3000));
        assert_eq!(layout.align_up(u64::MAX), None);
    }

    #[test]
    fn test_custom_page_size() {
        let layout = VmLayout::new(0, 0xffff_ffff, 0x20_0000);
        assert!(layout.is_aligned(0x40_0000));
        assert!(!layout.is_aligned(0x1000));
        assert_eq!(layout.align_up(1), Some(0x20_0000));
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn test_zero_page_size_rejected() {
        let _ = VmLayout::new(0, 0xffff, 0);
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn test_odd_page_size_rejected() {
        let _ = VmLayout::new(0, 0xffff, 0x1800);
    }
}
