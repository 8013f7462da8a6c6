//! # Region Mapping Attributes
//!
//! The attributes a translation table builder applies when mapping a region.
//! Only what the layout needs to decide (which regions may share a memory map
//! entry) is modeled; the concrete descriptor encoding belongs to the table
//! builder.

use bitfield_struct::bitfield;

/// Memory type of a mapping.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum MemoryType {
    /// Normal, write-back cacheable memory.
    Normal = 0,
    /// Normal memory with caching disabled (e.g. DMA buffers without coherency).
    NonCacheable = 1,
    /// Device memory, nGnRE.
    Device = 2,
}

impl MemoryType {
    const fn into_bits(self) -> u8 {
        self as u8
    }

    const fn from_bits(value: u8) -> Self {
        match value {
            1 => Self::NonCacheable,
            2 => Self::Device,
            _ => Self::Normal,
        }
    }
}

/// Mapping attributes of a region, packed into one byte.
///
/// ### Bit layout
///
/// | Bits | Field | Meaning |
/// |------|-------|---------|
/// | 0 | `readable` | May be read |
/// | 1 | `writable` | May be written |
/// | 2 | `executable` | May be executed |
/// | 3 | `secure` | Secure world only (NS=0) |
/// | 4 | `shared` | Accessed by more than one core |
/// | 5–6 | `memory_type` | [`MemoryType`] |
/// | 7 | reserved | |
///
/// Two adjacent regions with equal attributes can be described by a single
/// memory map entry.
///
/// ```rust
/// # use firmware_layout::attributes::{MemoryType, RegionAttributes};
/// let a = RegionAttributes::secure_data();
/// assert!(a.readable() && a.writable() && !a.executable());
/// assert_eq!(a.memory_type(), MemoryType::Normal);
/// assert_eq!(RegionAttributes::from_bits(a.into_bits()), a);
/// ```
#[bitfield(u8)]
#[derive(PartialEq, Eq, Hash)]
pub struct RegionAttributes {
    pub readable: bool,
    pub writable: bool,
    pub executable: bool,
    pub secure: bool,
    pub shared: bool,
    #[bits(2)]
    pub memory_type: MemoryType,
    #[bits(1)]
    __reserved: u8,
}

impl RegionAttributes {
    /// Read-only, executable, secure.
    #[must_use]
    pub const fn secure_code() -> Self {
        Self::new()
            .with_readable(true)
            .with_executable(true)
            .with_secure(true)
    }

    /// Read-write, never executable, secure.
    #[must_use]
    pub const fn secure_data() -> Self {
        Self::new()
            .with_readable(true)
            .with_writable(true)
            .with_secure(true)
    }

    /// A loaded secure image before its own stage splits it into code and data.
    #[must_use]
    pub const fn secure_image() -> Self {
        Self::secure_data().with_executable(true)
    }

    /// A loaded non-secure image.
    #[must_use]
    pub const fn non_secure_image() -> Self {
        Self::secure_image().with_secure(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let code = RegionAttributes::secure_code();
        assert!(code.executable() && !code.writable() && code.secure());

        let ns = RegionAttributes::non_secure_image();
        assert!(!ns.secure());
        assert!(ns.writable() && ns.executable());
        assert_ne!(ns, RegionAttributes::secure_image());
    }

    #[test]
    fn memory_type_packs_into_bits_5_and_6() {
        let dev = RegionAttributes::new().with_memory_type(MemoryType::Device);
        assert_eq!(dev.into_bits(), 0b0100_0000);
        assert_eq!(dev.memory_type(), MemoryType::Device);

        let nc = RegionAttributes::secure_data().with_memory_type(MemoryType::NonCacheable);
        assert_eq!(nc.into_bits(), 0b0010_1011);
    }
}
