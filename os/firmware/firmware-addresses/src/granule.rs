use core::fmt;
use core::hash::Hash;

/// Restricts `TranslationGranule` impls to the markers in this crate.
mod sealed {
    pub trait Sealed {}
}

/// Marker trait for AArch64 translation granules.
///
/// Boot stages only use [`Granule4K`]; 16 KiB and 64 KiB granules are not
/// supported by the layout.
pub trait TranslationGranule:
    sealed::Sealed + Clone + Copy + Eq + PartialEq + Ord + PartialOrd + Hash + fmt::Display + fmt::Debug
{
    /// Granule size in bytes (power of two).
    const SIZE: u64;
    /// log2(SIZE), i.e., number of low bits used for the in-granule offset.
    const SHIFT: u32;

    fn as_str() -> &'static str;
}

/// 4 KiB translation granule.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Granule4K;
impl sealed::Sealed for Granule4K {}
impl TranslationGranule for Granule4K {
    const SIZE: u64 = 4 * 1024;
    const SHIFT: u32 = 12;

    fn as_str() -> &'static str {
        "4K"
    }
}

impl fmt::Display for Granule4K {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(Self::as_str())
    }
}

impl fmt::Debug for Granule4K {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

const _: () = {
    assert!(Granule4K::SIZE == 1 << Granule4K::SHIFT);
};
