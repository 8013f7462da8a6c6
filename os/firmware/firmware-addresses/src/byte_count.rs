use core::fmt;

/// A size or offset in bytes.
///
/// Kept distinct from [`PhysicalAddress`](crate::PhysicalAddress) so that a
/// region size can never be passed where a base address is expected.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ByteCount(u64);

impl ByteCount {
    #[inline]
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    /// `v` KiB.
    ///
    /// # Panics
    /// If the byte count does not fit a `u64`; in a constant this is a
    /// compile-time error.
    #[inline]
    #[must_use]
    pub const fn kib(v: u64) -> Self {
        match v.checked_mul(1 << 10) {
            Some(bytes) => Self(bytes),
            None => panic!("KiB count overflows u64"),
        }
    }

    /// `v` MiB.
    ///
    /// # Panics
    /// If the byte count does not fit a `u64`; in a constant this is a
    /// compile-time error.
    #[inline]
    #[must_use]
    pub const fn mib(v: u64) -> Self {
        match v.checked_mul(1 << 20) {
            Some(bytes) => Self(bytes),
            None => panic!("MiB count overflows u64"),
        }
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

    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_power_of_two(self) -> bool {
        self.0.is_power_of_two()
    }

    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn checked_mul(self, rhs: u64) -> Option<Self> {
        match self.0.checked_mul(rhs) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl fmt::Debug for ByteCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteCount({:#X})", self.0)
    }
}

impl fmt::Display for ByteCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const KIB: u64 = 1024;
        const MIB: u64 = 1024 * KIB;
        match self.0 {
            v if v != 0 && v % MIB == 0 => write!(f, "{} MiB", v / MIB),
            v if v != 0 && v % KIB == 0 => write!(f, "{} KiB", v / KIB),
            v => write!(f, "{v} B"),
        }
    }
}

impl From<ByteCount> for u64 {
    #[inline]
    fn from(value: ByteCount) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_units() {
        assert_eq!(ByteCount::kib(4).as_u64(), 0x1000);
        assert_eq!(ByteCount::mib(2).as_u64(), 0x20_0000);
        assert_eq!(ByteCount::mib(3).to_string(), "3 MiB");
        assert_eq!(ByteCount::mib(1 << 43).as_u64(), 1 << 63);
    }

    #[test]
    #[should_panic(expected = "MiB count overflows u64")]
    fn mib_overflow_panics() {
        let _ = ByteCount::mib(1 << 44);
    }

    #[test]
    #[should_panic(expected = "KiB count overflows u64")]
    fn kib_overflow_panics() {
        let _ = ByteCount::kib(u64::MAX);
    }
}
