//! # Physical Address Types for Boot Firmware
//!
//! Strongly typed wrappers for the raw physical addresses, byte counts and
//! address ranges that make up a secure boot chain's memory map.
//!
//! ## Overview
//!
//! Every boot stage runs with an identity (flat) mapping, so only physical
//! addresses exist at this layer. The types here keep addresses, sizes and
//! ranges apart at compile time while remaining zero-cost wrappers around
//! `u64` values:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PhysicalAddress`] | A raw 64-bit physical address. |
//! | [`ByteCount`] | A size or offset in bytes. Never an address. |
//! | [`AddressRange`] | A half-open range `[base, base + size)`. |
//!
//! ## Translation Granules
//!
//! [`TranslationGranule`] describes a translation granule at the type level.
//! Every boot stage maps memory with [`Granule4K`] (4 KiB), so it is the only
//! marker provided.
//!
//! ## Checked Arithmetic
//!
//! Layout arithmetic must never wrap. All operations that can overflow come
//! in a `checked_*` flavor returning `Option`, and [`PhysicalAddress::fits_in_bits`]
//! checks a value against a platform's physical address width.
//!
//! ```rust
//! # use firmware_addresses::*;
//! let base = PhysicalAddress::new(0x0019_8000);
//! let limit = base.checked_add(ByteCount::new(0xC_0000)).unwrap();
//! assert_eq!(limit.as_u64(), 0x0025_8000);
//! assert!(limit.fits_in_bits(32));
//! assert!(base.is_aligned_to::<Granule4K>());
//!
//! let range = AddressRange::new(base, ByteCount::new(0xC_0000));
//! assert!(range.contains(PhysicalAddress::new(0x0020_0000)));
//! assert!(!range.contains(limit));
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod address_range;
mod byte_count;
mod granule;
mod physical_address;

pub use address_range::AddressRange;
pub use byte_count::ByteCount;
pub use granule::{Granule4K, TranslationGranule};
pub use physical_address::PhysicalAddress;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_add_detects_wrap() {
        let a = PhysicalAddress::new(u64::MAX - 0xF);
        assert!(a.checked_add(ByteCount::new(0x10)).is_none());
        assert_eq!(
            a.checked_add(ByteCount::new(0xF)),
            Some(PhysicalAddress::new(u64::MAX))
        );
    }

    #[test]
    fn address_width() {
        assert!(PhysicalAddress::new(0xFFFF_FFFF).fits_in_bits(32));
        assert!(!PhysicalAddress::new(0x1_0000_0000).fits_in_bits(32));
        assert!(PhysicalAddress::new(u64::MAX).fits_in_bits(64));
        assert!(PhysicalAddress::new(0).fits_in_bits(1));
    }

    #[test]
    fn end_exclusive_may_equal_address_space_size() {
        // A range ending exactly at 4 GiB still fits a 32-bit space.
        let r = AddressRange::new(
            PhysicalAddress::new(0xFFFF_F000),
            ByteCount::new(0x1000),
        );
        assert_eq!(r.end().map(PhysicalAddress::as_u64), Some(0x1_0000_0000));
        assert!(r.fits_in_bits(32));
        assert!(!r.fits_in_bits(31));
    }

    #[test]
    fn range_may_end_at_top_of_64_bit_space() {
        let top = AddressRange::new(PhysicalAddress::new(u64::MAX - 0xFFF), ByteCount::new(0x1000));
        assert_eq!(top.end(), None);
        assert!(top.fits_in_bits(64));
        assert!(!top.fits_in_bits(63));
        assert!(top.contains(PhysicalAddress::new(u64::MAX)));

        let all = AddressRange::new(PhysicalAddress::zero(), ByteCount::new(u64::MAX));
        assert!(all.contains_range(&AddressRange::new(PhysicalAddress::new(0x1000), ByteCount::new(0x1000))));
        assert!(!all.contains_range(&top));

        let past = AddressRange::new(PhysicalAddress::new(u64::MAX - 0xFFF), ByteCount::new(0x1001));
        assert!(!past.fits_in_bits(64));
        assert!(!past.contains(PhysicalAddress::new(u64::MAX)));
        assert!(!past.overlaps(&top));
    }

    #[test]
    fn alignment_helpers() {
        assert!(!PhysicalAddress::new(0x12345).is_aligned_to::<Granule4K>());
        assert!(PhysicalAddress::new(0x12000).is_aligned_to::<Granule4K>());
        assert!(!PhysicalAddress::new(0x40).is_aligned(0));
        assert!(PhysicalAddress::new(0x40).is_aligned(64));
        assert!(!PhysicalAddress::new(0x40).is_aligned(128));
    }

    #[test]
    fn range_relations() {
        let a = AddressRange::new(PhysicalAddress::new(0x1000), ByteCount::new(0x1000));
        let b = AddressRange::new(PhysicalAddress::new(0x2000), ByteCount::new(0x1000));
        let c = AddressRange::new(PhysicalAddress::new(0x1800), ByteCount::new(0x1000));

        // half-open: touching ranges do not overlap
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
        assert!(a.is_adjacent_to(&b));

        let outer = AddressRange::new(PhysicalAddress::new(0), ByteCount::new(0x1_0000));
        assert!(outer.contains_range(&a));
        assert!(!a.contains_range(&outer));
    }

    #[test]
    fn empty_range_never_overlaps() {
        let empty = AddressRange::new(PhysicalAddress::new(0x1000), ByteCount::new(0));
        let a = AddressRange::new(PhysicalAddress::new(0x0), ByteCount::new(0x2000));
        assert!(!empty.overlaps(&a));
        assert!(!a.overlaps(&empty));
    }
}
