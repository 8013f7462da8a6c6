//! # LCB Reference Profile
//!
//! Platform facts and stage budgets of the LCB board: two clusters, six
//! cores, 64-byte cache lines, 2 GiB of DRAM at address zero and a 32-bit
//! physical address space.
//!
//! ```text
//! 0x0000_0000 ┌───────────────────────────────┐ ── ROM window (2 MiB)
//! 0x0000_2000 │ BL1 RO          (reset vector)│
//! 0x0001_8000 │ BL1 RW                        │
//! 0x0011_8000 │   BL1 stack/heap headroom     │
//! 0x0019_8000 │ BL2                           │
//! 0x0025_8000 │   BL2 reserved tail           │
//! 0x002F_0000 │ translation tables            │
//! 0x002F_F000 │ mailboxes                     │
//! 0x0030_0000 │ BL31                          │
//! 0x0040_0000 │ BL32             (secure DRAM)│
//! 0x0080_0000 │ I/O descriptors               │
//! 0x0082_0000 │ I/O data                      │
//! 0x0200_0000 │ BL33                          │
//! 0x0300_0000 │                               │
//!             ┆          ...                  ┆
//! 0x8000_0000 └───────────────────────────────┘
//! ```
//!
//! Region sizes are the board's; the offsets are chosen so that the chained
//! regions stay disjoint. They are configuration, not a contract: override
//! them with the `with_*` setters for a different board.

use crate::{BootStage, CacheGeometry, StageBudgets, StageLimits, TopologyConfig};
use firmware_addresses::{AddressRange, ByteCount, PhysicalAddress};

pub const CLUSTER_COUNT: u32 = 2;
pub const CORE_COUNT: u32 = 6;

/// Writeback granule shift: every cache level uses 64-byte lines.
pub const CACHE_WRITEBACK_SHIFT: u32 = 6;
pub const CACHE_WRITEBACK_GRANULE: u64 = 1 << CACHE_WRITEBACK_SHIFT;

pub const DRAM_BASE: u64 = 0x0000_0000;
pub const DRAM_SIZE: u64 = 0x8000_0000;

pub const DRAM_SEC_BASE: u64 = 0x0040_0000;
pub const DRAM_SEC_SIZE: u64 = 0x0040_0000;

/// On-chip RAM the first stage is stored in.
pub const XG2RAM0_BASE: u64 = 0x0000_0000;
pub const XG2RAM0_SIZE: u64 = 0x0020_0000;
/// Parameters left behind by the on-chip boot ROM.
pub const ONCHIPROM_PARAM_BASE: u64 = XG2RAM0_BASE + 0x1000;
/// Offset of the first stage within the on-chip RAM.
pub const BL1_XG2RAM0_OFFSET: u64 = 0x2000;

pub const ADDRESS_SPACE_BITS: u32 = 32;

/// Size of each core's cacheable stack.
pub const PLATFORM_STACK_SIZE: ByteCount = ByteCount::new(0x800);

pub const MAX_IO_DEVICES: u32 = 3;
pub const MAX_IO_HANDLES: u32 = 4;

/// Memory map entries available to every stage.
pub const MAX_MMAP_REGIONS: u32 = 16;

/// Raw topology of the board, validate it with
/// [`PlatformTopology::new`](crate::PlatformTopology::new).
#[must_use]
pub fn topology_config() -> TopologyConfig {
    TopologyConfig {
        cluster_count: CLUSTER_COUNT,
        core_count: CORE_COUNT,
        cache: cache_geometry(),
        dram: range(DRAM_BASE, DRAM_SIZE),
        secure_dram: range(DRAM_SEC_BASE, DRAM_SEC_SIZE),
        rom: range(XG2RAM0_BASE, XG2RAM0_SIZE),
        reset_vector: PhysicalAddress::new(XG2RAM0_BASE + BL1_XG2RAM0_OFFSET),
        address_space_bits: ADDRESS_SPACE_BITS,
    }
}

/// L1 and L2 both use the writeback granule.
#[must_use]
pub fn cache_geometry() -> CacheGeometry {
    match CacheGeometry::from_line_sizes(&[CACHE_WRITEBACK_GRANULE, CACHE_WRITEBACK_GRANULE]) {
        Ok(cache) => cache,
        Err(_) => unreachable!("writeback granule is a power of two"),
    }
}

#[must_use]
pub const fn budgets() -> StageBudgets {
    StageBudgets {
        bl1_ro_size: ByteCount::new(0x0001_6000),
        bl1_rw_offset: ByteCount::zero(),
        bl1_rw_size: ByteCount::new(0x0010_0000),
        bl2_offset: ByteCount::new(0x0008_0000),
        bl2_size: ByteCount::new(0x0010_0000),
        bl2_reserved_tail: ByteCount::new(0x0004_0000),
        bl31_offset: ByteCount::new(0x0030_0000),
        ns_image_offset: ByteCount::new(0x0200_0000),
        bl33_size: ByteCount::new(0x0100_0000),
        descriptor_offset: ByteCount::new(0x0080_0000),
        descriptor_size: ByteCount::new(0x0002_0000),
        data_size: ByteCount::new(0x0080_0000),
        xlat_offset: ByteCount::new(0x002F_0000),
        mailbox_offset: ByteCount::new(0x002F_F000),
        mailbox_reserved_size: ByteCount::new(0x1000),
    }
}

/// The runtime firmware keeps its tables small; loaders and the secure
/// payload need an extra level.
#[must_use]
pub const fn stage_limits(stage: BootStage) -> StageLimits {
    let max_xlat_tables = match stage {
        BootStage::Bl31 => 2,
        BootStage::Bl1 | BootStage::Bl2 | BootStage::Bl32 => 3,
    };
    StageLimits {
        max_xlat_tables,
        max_mmap_regions: MAX_MMAP_REGIONS,
    }
}

const fn range(base: u64, size: u64) -> AddressRange {
    AddressRange::new(PhysicalAddress::new(base), ByteCount::new(size))
}

const _: () = {
    assert!(CACHE_WRITEBACK_GRANULE.is_power_of_two());
    assert!(PLATFORM_STACK_SIZE.as_u64() % CACHE_WRITEBACK_GRANULE == 0);
    assert!(ONCHIPROM_PARAM_BASE < XG2RAM0_BASE + BL1_XG2RAM0_OFFSET);
    assert!(DRAM_SEC_BASE + DRAM_SEC_SIZE <= DRAM_BASE + DRAM_SIZE);
};
