//! # Layout Plan
//!
//! The ordered list of regions a derivation produced, before validation.

use crate::region::{Region, RegionId};
use alloc::vec::Vec;
use firmware_addresses::AddressRange;

/// Regions of one boot chain layout, in derivation order.
///
/// A plan is not necessarily consistent; only a
/// [`ValidatedLayout`](crate::ValidatedLayout) is. Plans can be assembled by
/// hand with [`from_regions`](Self::from_regions) to check a layout that was
/// not produced by [`derive_layout`](crate::derive_layout).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LayoutPlan {
    regions: Vec<Region>,
    mailbox_window: AddressRange,
}

impl LayoutPlan {
    #[must_use]
    pub const fn from_regions(regions: Vec<Region>, mailbox_window: AddressRange) -> Self {
        Self {
            regions,
            mailbox_window,
        }
    }

    /// First region with the given id.
    #[must_use]
    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| r.id() == id)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Mailbox slot regions, in plan order.
    pub fn mailboxes(&self) -> impl Iterator<Item = &Region> {
        self.regions
            .iter()
            .filter(|r| matches!(r.id(), RegionId::Mailbox(_)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Window reserved for the per-core mailboxes. Not a region itself.
    #[must_use]
    pub const fn mailbox_window(&self) -> AddressRange {
        self.mailbox_window
    }

    /// Replace the region with the same id, returning the old one.
    ///
    /// If the plan has no such region, `region` is appended.
    pub fn replace(&mut self, region: Region) -> Option<Region> {
        match self.regions.iter_mut().find(|r| r.id() == region.id()) {
            Some(slot) => Some(core::mem::replace(slot, region)),
            None => {
                self.regions.push(region);
                None
            }
        }
    }
}

impl<'a> IntoIterator for &'a LayoutPlan {
    type Item = &'a Region;
    type IntoIter = core::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firmware_addresses::{ByteCount, PhysicalAddress};

    fn region(id: RegionId, base: u64, size: u64) -> Region {
        Region::new(
            id,
            PhysicalAddress::new(base),
            ByteCount::new(size),
            0x40,
            32,
        )
        .unwrap()
    }

    #[test]
    fn replace_swaps_by_id() {
        let window = AddressRange::new(PhysicalAddress::new(0x1000), ByteCount::new(0x100));
        let mut plan = LayoutPlan::from_regions(
            vec![
                region(RegionId::Bl31, 0x3000, 0x1000),
                region(RegionId::Mailbox(0), 0x1000, 0x40),
            ],
            window,
        );

        let old = plan.replace(region(RegionId::Bl31, 0x4000, 0x1000));
        assert_eq!(old.map(|r| r.base().as_u64()), Some(0x3000));
        assert_eq!(plan.get(RegionId::Bl31).map(|r| r.base().as_u64()), Some(0x4000));
        assert_eq!(plan.len(), 2);

        assert!(plan.replace(region(RegionId::Mailbox(1), 0x1040, 0x40)).is_none());
        assert_eq!(plan.mailboxes().count(), 2);
        assert_eq!(plan.mailbox_window(), window);
    }
}
