use crate::{ByteCount, TranslationGranule};
use core::fmt;

/// Physical memory address.
///
/// A thin wrapper around a raw `u64` that denotes a **physical** address
/// (DRAM, on-chip RAM/ROM or MMIO). It carries intent only; it is not
/// checked against any platform's address width until asked to via
/// [`fits_in_bits`](Self::fits_in_bits).
///
/// ### Semantics
/// - Arithmetic is by [`ByteCount`] only; adding two addresses is meaningless.
/// - Use [`checked_add`](Self::checked_add) for all layout computations, the
///   result must never wrap.
/// - [`offset_from`](Self::offset_from) yields the distance between two
///   addresses as a [`ByteCount`].
///
/// ### Examples
/// ```rust
/// # use firmware_addresses::*;
/// let pa = PhysicalAddress::new(0x0011_8000);
/// let next = pa.checked_add(ByteCount::new(0x8_0000)).unwrap();
/// assert_eq!(next.offset_from(pa), Some(ByteCount::new(0x8_0000)));
/// assert_eq!(pa.offset_from(next), None);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(u64);

impl PhysicalAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Add a byte count, returning `None` on `u64` overflow.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: ByteCount) -> Option<Self> {
        match self.0.checked_add(rhs.as_u64()) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Distance from `origin` up to `self`; `None` if `self` lies below `origin`.
    #[inline]
    #[must_use]
    pub const fn offset_from(self, origin: Self) -> Option<ByteCount> {
        match self.0.checked_sub(origin.0) {
            Some(v) => Some(ByteCount::new(v)),
            None => None,
        }
    }

    /// Whether this address is representable with `bits` physical address bits.
    ///
    /// Because region limits are exclusive, callers checking an *end* address
    /// should use [`AddressRange::fits_in_bits`](crate::AddressRange::fits_in_bits)
    /// instead, which allows the end to equal `2^bits`.
    #[inline]
    #[must_use]
    pub const fn fits_in_bits(self, bits: u32) -> bool {
        bits >= u64::BITS || (self.0 >> bits) == 0
    }

    /// Whether this address is a multiple of `alignment`.
    ///
    /// `alignment` must be a power of two; zero is treated as "never aligned".
    #[inline]
    #[must_use]
    pub const fn is_aligned(self, alignment: u64) -> bool {
        alignment.is_power_of_two() && (self.0 & (alignment - 1)) == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_aligned_to<G: TranslationGranule>(self) -> bool {
        self.is_aligned(G::SIZE)
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA(0x{:016X})", self.0)
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 32-bit platforms read better without the leading zero half
        if self.0 >> 32 == 0 {
            write!(f, "0x{:08X}", self.0)
        } else {
            write!(f, "0x{:016X}", self.0)
        }
    }
}

impl fmt::LowerHex for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl From<PhysicalAddress> for u64 {
    #[inline]
    fn from(value: PhysicalAddress) -> Self {
        value.0
    }
}
