//! # Region Descriptor
//!
//! One named, aligned range of physical memory.

use crate::attributes::RegionAttributes;
use crate::error::InvalidRegion;
use core::fmt;
use firmware_addresses::{
    AddressRange, ByteCount, Granule4K, PhysicalAddress, TranslationGranule,
};
use firmware_platform::images::BL1_MEM_NAME;
use firmware_platform::{BootImage, BootStage, PlatformTopology};

/// Translation granule every boot stage maps memory with.
pub type StageGranule = Granule4K;

/// Identity of a region in the layout. Stable; never renumbered.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RegionId {
    /// First stage code and read-only data, at the reset vector.
    Bl1Rom,
    /// First stage read-write data, relocated out of ROM at runtime.
    Bl1Ram,
    Bl2,
    Bl31,
    Bl32,
    Bl33,
    /// I/O (storage controller) descriptor area.
    DescriptorArea,
    /// I/O data area following the descriptors.
    DataArea,
    /// Translation table pool of the stage being built.
    TranslationTables,
    /// Mailbox slot of one core.
    Mailbox(u32),
}

/// Which boundary a region's base must sit on.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AlignmentClass {
    /// Mapped with its own translation entries: granule aligned at both ends.
    Granule,
    /// Shared with DMA engines or other cores: writeback-granule aligned.
    CacheLine,
}

impl RegionId {
    /// All ids that are not per-core, in derivation order.
    pub const FIXED: [Self; 9] = [
        Self::Bl1Rom,
        Self::Bl1Ram,
        Self::Bl2,
        Self::Bl31,
        Self::Bl32,
        Self::DescriptorArea,
        Self::DataArea,
        Self::TranslationTables,
        Self::Bl33,
    ];

    #[must_use]
    pub const fn alignment_class(self) -> AlignmentClass {
        match self {
            Self::Bl1Rom
            | Self::Bl1Ram
            | Self::Bl2
            | Self::Bl31
            | Self::Bl32
            | Self::Bl33
            | Self::TranslationTables => AlignmentClass::Granule,
            Self::DescriptorArea | Self::DataArea | Self::Mailbox(_) => AlignmentClass::CacheLine,
        }
    }

    /// Alignment this region must honor on `topology`.
    #[must_use]
    pub fn required_alignment(self, topology: &PlatformTopology) -> u64 {
        match self.alignment_class() {
            AlignmentClass::Granule => StageGranule::SIZE,
            AlignmentClass::CacheLine => topology.cache_line_size(),
        }
    }

    /// First-stage regions may live in the trusted ROM window instead of DRAM.
    #[must_use]
    pub const fn is_first_stage(self) -> bool {
        matches!(self, Self::Bl1Rom | Self::Bl1Ram)
    }

    /// The image loaded into (or executed from) this region.
    #[must_use]
    pub const fn image(self) -> Option<BootImage> {
        match self {
            Self::Bl1Rom => Some(BootImage::Bl1),
            Self::Bl2 => Some(BootImage::Bl2),
            Self::Bl31 => Some(BootImage::Bl31),
            Self::Bl32 => Some(BootImage::Bl32),
            Self::Bl33 => Some(BootImage::Bl33),
            _ => None,
        }
    }

    /// Region a boot stage is loaded into and entered at.
    #[must_use]
    pub const fn of_stage(stage: BootStage) -> Self {
        match stage {
            BootStage::Bl1 => Self::Bl1Rom,
            BootStage::Bl2 => Self::Bl2,
            BootStage::Bl31 => Self::Bl31,
            BootStage::Bl32 => Self::Bl32,
        }
    }

    /// Whether `stage` maps this region in its translation tables.
    #[must_use]
    pub const fn is_mapped_by(self, stage: BootStage) -> bool {
        match stage {
            // runs in place, loads BL2 through the I/O areas, parks secondaries
            BootStage::Bl1 => matches!(
                self,
                Self::Bl1Rom
                    | Self::Bl1Ram
                    | Self::Bl2
                    | Self::DescriptorArea
                    | Self::DataArea
                    | Self::TranslationTables
                    | Self::Mailbox(_)
            ),
            // loads every later image
            BootStage::Bl2 => matches!(
                self,
                Self::Bl2
                    | Self::Bl31
                    | Self::Bl32
                    | Self::Bl33
                    | Self::DescriptorArea
                    | Self::DataArea
                    | Self::TranslationTables
            ),
            BootStage::Bl31 => matches!(
                self,
                Self::Bl31 | Self::TranslationTables | Self::Mailbox(_)
            ),
            BootStage::Bl32 => matches!(self, Self::Bl32 | Self::TranslationTables),
        }
    }

    /// Default mapping attributes of the region.
    #[must_use]
    pub const fn attributes(self) -> RegionAttributes {
        match self {
            Self::Bl1Rom => RegionAttributes::secure_code(),
            Self::Bl1Ram | Self::DescriptorArea | Self::DataArea | Self::TranslationTables => {
                RegionAttributes::secure_data()
            }
            Self::Bl2 | Self::Bl31 | Self::Bl32 => RegionAttributes::secure_image(),
            Self::Bl33 => RegionAttributes::non_secure_image(),
            Self::Mailbox(_) => RegionAttributes::secure_data().with_shared(true),
        }
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bl1Rom => f.write_str("bl1_rom"),
            Self::Bl1Ram => f.write_str(BL1_MEM_NAME),
            Self::Bl2 => f.write_str("bl2"),
            Self::Bl31 => f.write_str("bl31"),
            Self::Bl32 => f.write_str("bl32"),
            Self::Bl33 => f.write_str("bl33"),
            Self::DescriptorArea => f.write_str("io_descriptors"),
            Self::DataArea => f.write_str("io_data"),
            Self::TranslationTables => f.write_str("xlat_tables"),
            Self::Mailbox(core) => write!(f, "mailbox[{core}]"),
        }
    }
}

/// A named physical memory region.
///
/// ### Invariants
/// - `size > 0`
/// - `alignment` is a power of two and `base % alignment == 0`
/// - `limit == base + size` and `limit <= 2^address_space_bits`
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Region {
    id: RegionId,
    base: PhysicalAddress,
    size: ByteCount,
    limit: PhysicalAddress,
    alignment: u64,
}

impl Region {
    /// Create a region, checking its internal invariants.
    pub fn new(
        id: RegionId,
        base: PhysicalAddress,
        size: ByteCount,
        alignment: u64,
        address_space_bits: u32,
    ) -> Result<Self, InvalidRegion> {
        if size.is_zero() {
            return Err(InvalidRegion::ZeroSize { id });
        }
        if !alignment.is_power_of_two() {
            return Err(InvalidRegion::BadAlignment { id, alignment });
        }
        if !base.is_aligned(alignment) {
            return Err(InvalidRegion::Misaligned {
                id,
                base,
                alignment,
            });
        }

        let range = AddressRange::new(base, size);
        let limit = match range.end() {
            Some(limit) if range.fits_in_bits(address_space_bits) => limit,
            _ => {
                return Err(InvalidRegion::ExceedsAddressSpace {
                    id,
                    base,
                    size,
                    bits: address_space_bits,
                });
            }
        };

        Ok(Self {
            id,
            base,
            size,
            limit,
            alignment,
        })
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> RegionId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn base(&self) -> PhysicalAddress {
        self.base
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> ByteCount {
        self.size
    }

    /// Exclusive end address.
    #[inline]
    #[must_use]
    pub const fn limit(&self) -> PhysicalAddress {
        self.limit
    }

    #[inline]
    #[must_use]
    pub const fn alignment(&self) -> u64 {
        self.alignment
    }

    #[inline]
    #[must_use]
    pub const fn range(&self) -> AddressRange {
        AddressRange::new(self.base, self.size)
    }

    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.range().overlaps(&other.range())
    }

    #[must_use]
    pub const fn contains(&self, addr: PhysicalAddress) -> bool {
        self.range().contains(addr)
    }

    #[must_use]
    pub const fn contains_range(&self, range: &AddressRange) -> bool {
        self.range().contains_range(range)
    }

    #[must_use]
    pub fn is_adjacent_to(&self, other: &Self) -> bool {
        self.range().is_adjacent_to(&other.range())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}..{} ({})",
            self.id, self.base, self.limit, self.size
        )
    }
}
