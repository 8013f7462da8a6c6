//! # Platform Topology
//!
//! Static facts about the target SoC that every layout derivation consumes.

use crate::CacheGeometry;
use firmware_addresses::{AddressRange, PhysicalAddress};
use utils_accessors_derive::Setters;

/// Raw, unchecked platform description.
///
/// Turn it into a [`PlatformTopology`] with [`PlatformTopology::new`]; that is
/// the only way to obtain one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Setters)]
pub struct TopologyConfig {
    pub cluster_count: u32,
    pub core_count: u32,
    pub cache: CacheGeometry,
    /// Physical DRAM envelope.
    pub dram: AddressRange,
    /// Secure-only DRAM carve-out, must lie inside [`dram`](Self::dram).
    pub secure_dram: AddressRange,
    /// Trusted on-chip ROM/RAM window the first stage executes from.
    pub rom: AddressRange,
    /// First instruction fetched after reset; start of the first stage.
    pub reset_vector: PhysicalAddress,
    /// Physical address width in bits.
    pub address_space_bits: u32,
}

/// Error returned when the platform description is not self-consistent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("core count must not be zero")]
    NoCores,
    #[error("cluster count must not be zero")]
    NoClusters,
    #[error("{cores} cores cannot populate {clusters} clusters")]
    FewerCoresThanClusters { cores: u32, clusters: u32 },
    #[error("no cache level described")]
    NoCacheLevels,
    #[error("{0} cache levels described, at most {max} supported", max = crate::MAX_CACHE_LEVELS)]
    TooManyCacheLevels(usize),
    #[error("L{level} cache line size {size:#x} is not a power of two")]
    CacheLineNotPowerOfTwo { level: usize, size: u64 },
    #[error("address space width of {0} bits is not supported")]
    AddressSpaceBits(u32),
    #[error("DRAM range {0} is empty or exceeds the address space")]
    InvalidDram(AddressRange),
    #[error("secure DRAM range {0} is empty or not inside DRAM")]
    InvalidSecureDram(AddressRange),
    #[error("ROM window {0} is empty or exceeds the address space")]
    InvalidRom(AddressRange),
    #[error("reset vector {0} lies outside the ROM window")]
    ResetVectorOutsideRom(PhysicalAddress),
}

/// Validated, immutable platform description.
///
/// ### Invariants
/// - `core_count >= cluster_count >= 1`
/// - at least one cache level, every line size a power of two
/// - `1 <= address_space_bits <= 64`
/// - DRAM and ROM window are non-empty and addressable
/// - secure DRAM is non-empty and inside DRAM
/// - the reset vector lies inside the ROM window
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PlatformTopology {
    config: TopologyConfig,
}

impl PlatformTopology {
    /// The single validation step for platform facts.
    pub fn new(config: TopologyConfig) -> Result<Self, TopologyError> {
        if config.core_count == 0 {
            return Err(TopologyError::NoCores);
        }
        if config.cluster_count == 0 {
            return Err(TopologyError::NoClusters);
        }
        if config.core_count < config.cluster_count {
            return Err(TopologyError::FewerCoresThanClusters {
                cores: config.core_count,
                clusters: config.cluster_count,
            });
        }

        let cache = config.cache;
        if cache.levels() == 0 {
            return Err(TopologyError::NoCacheLevels);
        }
        for (index, size) in cache.iter().enumerate() {
            if !size.is_power_of_two() {
                return Err(TopologyError::CacheLineNotPowerOfTwo {
                    level: index + 1,
                    size,
                });
            }
        }

        let bits = config.address_space_bits;
        if bits == 0 || bits > u64::BITS {
            return Err(TopologyError::AddressSpaceBits(bits));
        }

        if config.dram.is_empty() || !config.dram.fits_in_bits(bits) {
            return Err(TopologyError::InvalidDram(config.dram));
        }
        if config.secure_dram.is_empty() || !config.dram.contains_range(&config.secure_dram) {
            return Err(TopologyError::InvalidSecureDram(config.secure_dram));
        }
        if config.rom.is_empty() || !config.rom.fits_in_bits(bits) {
            return Err(TopologyError::InvalidRom(config.rom));
        }
        if !config.rom.contains(config.reset_vector) {
            return Err(TopologyError::ResetVectorOutsideRom(config.reset_vector));
        }

        Ok(Self { config })
    }

    #[must_use]
    pub const fn cluster_count(&self) -> u32 {
        self.config.cluster_count
    }

    #[must_use]
    pub const fn core_count(&self) -> u32 {
        self.config.core_count
    }

    /// Number of power-domain tree nodes: one per cluster plus one per core.
    #[must_use]
    pub const fn affinity_instance_count(&self) -> u32 {
        self.config.cluster_count + self.config.core_count
    }

    #[must_use]
    pub const fn cache(&self) -> &CacheGeometry {
        &self.config.cache
    }

    /// The largest cache line size among all cache levels.
    ///
    /// This is the writeback granule: two objects spaced by it never share a
    /// line at any level.
    #[must_use]
    pub fn cache_line_size(&self) -> u64 {
        self.config.cache.largest_line_size()
    }

    #[must_use]
    pub const fn dram(&self) -> AddressRange {
        self.config.dram
    }

    #[must_use]
    pub const fn secure_dram(&self) -> AddressRange {
        self.config.secure_dram
    }

    #[must_use]
    pub const fn rom(&self) -> AddressRange {
        self.config.rom
    }

    #[must_use]
    pub const fn reset_vector(&self) -> PhysicalAddress {
        self.config.reset_vector
    }

    #[must_use]
    pub const fn address_space_bits(&self) -> u32 {
        self.config.address_space_bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcb;
    use firmware_addresses::ByteCount;

    fn range(base: u64, size: u64) -> AddressRange {
        AddressRange::new(PhysicalAddress::new(base), ByteCount::new(size))
    }

    #[test]
    fn lcb_profile_is_valid() {
        let t = PlatformTopology::new(lcb::topology_config()).unwrap();
        assert_eq!(t.cluster_count(), 2);
        assert_eq!(t.core_count(), 6);
        assert_eq!(t.affinity_instance_count(), 8);
        assert_eq!(t.cache_line_size(), 64);
        assert_eq!(t.address_space_bits(), 32);
    }

    #[test]
    fn rejects_zero_counts() {
        let c = lcb::topology_config();
        assert_eq!(
            PlatformTopology::new(c.with_core_count(0)),
            Err(TopologyError::NoCores)
        );
        assert_eq!(
            PlatformTopology::new(c.with_cluster_count(0)),
            Err(TopologyError::NoClusters)
        );
        assert_eq!(
            PlatformTopology::new(c.with_core_count(1)),
            Err(TopologyError::FewerCoresThanClusters {
                cores: 1,
                clusters: 2
            })
        );
    }

    #[test]
    fn cache_line_uses_largest_level() {
        let cache = CacheGeometry::from_line_sizes(&[64, 128]).unwrap();
        let t = PlatformTopology::new(lcb::topology_config().with_cache(cache)).unwrap();
        assert_eq!(t.cache_line_size(), 128);
    }

    #[test]
    fn rejects_bad_address_width() {
        let c = lcb::topology_config();
        assert_eq!(
            PlatformTopology::new(c.with_address_space_bits(0)),
            Err(TopologyError::AddressSpaceBits(0))
        );
        assert_eq!(
            PlatformTopology::new(c.with_address_space_bits(65)),
            Err(TopologyError::AddressSpaceBits(65))
        );
        // 2 GiB of DRAM does not fit 30 bits
        assert!(matches!(
            PlatformTopology::new(c.with_address_space_bits(30)),
            Err(TopologyError::InvalidDram(_))
        ));
    }

    #[test]
    fn rejects_misplaced_ranges() {
        let c = lcb::topology_config();
        assert!(matches!(
            PlatformTopology::new(c.with_secure_dram(range(0x8000_0000, 0x1000))),
            Err(TopologyError::InvalidSecureDram(_))
        ));
        assert!(matches!(
            PlatformTopology::new(c.with_secure_dram(range(0x40_0000, 0))),
            Err(TopologyError::InvalidSecureDram(_))
        ));
        assert_eq!(
            PlatformTopology::new(c.with_reset_vector(PhysicalAddress::new(0x20_0000))),
            Err(TopologyError::ResetVectorOutsideRom(PhysicalAddress::new(
                0x20_0000
            )))
        );
    }
}
