//! # Stage Size Budgets
//!
//! Sizes and offsets of every boot stage's region. These are configuration
//! data supplied per target platform; the layout engine only chains them.

use firmware_addresses::ByteCount;
use utils_accessors_derive::Setters;

/// Region sizes and placement offsets for all boot stages.
///
/// Offsets named `*_offset` are relative to the DRAM base unless stated
/// otherwise. Use the generated `with_*` setters to derive a variant of a
/// reference profile:
///
/// ```rust
/// use firmware_addresses::ByteCount;
/// use firmware_platform::lcb;
///
/// let budgets = lcb::budgets().with_bl2_size(ByteCount::mib(2));
/// assert_eq!(budgets.bl2_size, ByteCount::mib(2));
/// assert_eq!(budgets.bl1_rw_size, lcb::budgets().bl1_rw_size);
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Setters)]
pub struct StageBudgets {
    /// Size of the first stage's code and read-only data at the reset vector.
    pub bl1_ro_size: ByteCount,
    /// Gap between the end of BL1 RO and the start of BL1 RW.
    pub bl1_rw_offset: ByteCount,
    /// Size of the first stage's relocated read-write data.
    pub bl1_rw_size: ByteCount,
    /// Gap between the end of BL1 RW and BL2, headroom for BL1 stack/heap.
    pub bl2_offset: ByteCount,
    /// Configured BL2 size, including the reserved tail.
    pub bl2_size: ByteCount,
    /// Trailing slice of BL2's budget held back for higher-privileged firmware.
    pub bl2_reserved_tail: ByteCount,
    /// Start of the EL3 runtime, reserved low DRAM sits below it.
    pub bl31_offset: ByteCount,
    /// Load address of the non-secure payload.
    pub ns_image_offset: ByteCount,
    pub bl33_size: ByteCount,
    /// Start of the I/O descriptor area.
    pub descriptor_offset: ByteCount,
    pub descriptor_size: ByteCount,
    /// Size of the I/O data area that follows the descriptor area.
    pub data_size: ByteCount,
    /// Start of the translation table pool.
    pub xlat_offset: ByteCount,
    /// Start of the window reserved for per-core mailboxes.
    pub mailbox_offset: ByteCount,
    pub mailbox_reserved_size: ByteCount,
}
