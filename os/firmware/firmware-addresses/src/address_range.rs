use crate::{ByteCount, PhysicalAddress};
use core::fmt;

/// A half-open physical address range `[base, base + size)`.
///
/// Unlike a layout region, a range carries no identity and is not validated
/// on construction: an empty or wrapping range is representable, and every
/// query treats it conservatively (an empty range contains and overlaps
/// nothing; a range past `2^64` fits nothing and contains nothing).
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct AddressRange {
    base: PhysicalAddress,
    size: ByteCount,
}

impl AddressRange {
    #[inline]
    #[must_use]
    pub const fn new(base: PhysicalAddress, size: ByteCount) -> Self {
        Self { base, size }
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

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size.is_zero()
    }

    /// Exclusive end address, or `None` if `base + size` does not fit a `u64`.
    ///
    /// A range ending exactly at `2^64` is valid but has no `end`.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> Option<PhysicalAddress> {
        self.base.checked_add(self.size)
    }

    /// Inclusive last address; `None` for empty and wrapping ranges.
    const fn last(&self) -> Option<u64> {
        if self.size.is_zero() {
            return None;
        }
        self.base.as_u64().checked_add(self.size.as_u64() - 1)
    }

    /// Whether the whole range is addressable with `bits` physical address bits.
    ///
    /// The exclusive end may equal `2^bits`, including `2^64`.
    #[must_use]
    pub const fn fits_in_bits(&self, bits: u32) -> bool {
        if self.size.is_zero() {
            return bits >= u64::BITS || self.base.as_u64() <= (1u64 << bits);
        }
        let Some(last) = self.last() else {
            return false;
        };
        bits >= u64::BITS || last < (1u64 << bits)
    }

    #[must_use]
    pub const fn contains(&self, addr: PhysicalAddress) -> bool {
        let Some(last) = self.last() else {
            return false;
        };
        addr.as_u64() >= self.base.as_u64() && addr.as_u64() <= last
    }

    /// Whether `other` lies entirely inside this range.
    ///
    /// An empty `other` is contained if its base lies within `[base, end]`.
    #[must_use]
    pub const fn contains_range(&self, other: &Self) -> bool {
        let Some(offset) = other.base.offset_from(self.base) else {
            return false;
        };
        if self.last().is_none() && !self.size.is_zero() {
            return false;
        }
        if other.size.is_zero() {
            return offset.as_u64() <= self.size.as_u64();
        }
        match (self.last(), other.last()) {
            (Some(last), Some(other_last)) => other_last <= last,
            _ => false,
        }
    }

    /// Half-open interval intersection test.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        let (Some(last), Some(other_last)) = (self.last(), other.last()) else {
            return false;
        };
        self.base.as_u64() <= other_last && other.base.as_u64() <= last
    }

    /// Whether one range ends exactly where the other begins.
    #[must_use]
    pub fn is_adjacent_to(&self, other: &Self) -> bool {
        self.end() == Some(other.base) || other.end() == Some(self.base)
    }
}

impl fmt::Debug for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end() {
            Some(end) => write!(f, "[{}..{})", self.base, end),
            None => write!(f, "[{}..+{:?} wraps)", self.base, self.size),
        }
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
