//! # Boot Stage Hand-off
//!
//! The record a boot stage passes to the next one when it transfers control.
//! It carries where the next stage was loaded and the shared memory both
//! stages must agree on, taken from a [`ValidatedLayout`] only.
//!
//! ## Hand-off order
//!
//! ```text
//! BL1 ──► BL2 ──► BL31 ──► BL32
//!                  │
//!                  └──────► BL33 (non-secure world)
//! ```
//!
//! ```rust
//! use firmware_handoff::{HandoffTable, HandoffTarget};
//! use firmware_layout::{build_layout, LayoutConfig, RegionId};
//! use firmware_platform::BootStage;
//!
//! let layout = build_layout(&LayoutConfig::lcb(BootStage::Bl1).unwrap()).unwrap();
//! let table = HandoffTable::for_stage(&layout, BootStage::Bl1).unwrap();
//!
//! assert!(table.is_valid());
//! assert_eq!(table.target(), Some(HandoffTarget::Stage(BootStage::Bl2)));
//! assert_eq!(table.entry_point(), layout.region(RegionId::Bl2).unwrap().base());
//! ```
//!
//! ## ABI
//!
//! [`HandoffTable`] is `#[repr(C)]` with fixed-width fields only; enums cross
//! the boundary as plain tags.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

use core::mem::{align_of, size_of};
use firmware_addresses::{AddressRange, ByteCount, PhysicalAddress};
use firmware_layout::{Region, RegionId, ValidatedLayout};
use firmware_platform::BootStage;

/// `"BLHO"` in little-endian byte order.
pub const HANDOFF_MAGIC: u32 = u32::from_le_bytes(*b"BLHO");
pub const HANDOFF_VERSION: u32 = 1;

/// Where control goes next.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HandoffTarget {
    Stage(BootStage),
    /// The non-secure payload, entered by the runtime firmware.
    NonSecure,
}

impl HandoffTarget {
    /// Tag as stored in [`HandoffTable::to_stage`].
    #[must_use]
    pub const fn tag(self) -> u32 {
        match self {
            Self::Stage(stage) => stage_tag(stage),
            Self::NonSecure => 33,
        }
    }

    #[must_use]
    pub const fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            33 => Some(Self::NonSecure),
            tag => match stage_from_tag(tag) {
                Some(stage) => Some(Self::Stage(stage)),
                None => None,
            },
        }
    }

    const fn region(self) -> RegionId {
        match self {
            Self::Stage(stage) => RegionId::of_stage(stage),
            Self::NonSecure => RegionId::Bl33,
        }
    }
}

/// Numeric tag of a stage, as in its image name.
#[must_use]
pub const fn stage_tag(stage: BootStage) -> u32 {
    match stage {
        BootStage::Bl1 => 1,
        BootStage::Bl2 => 2,
        BootStage::Bl31 => 31,
        BootStage::Bl32 => 32,
    }
}

#[must_use]
pub const fn stage_from_tag(tag: u32) -> Option<BootStage> {
    match tag {
        1 => Some(BootStage::Bl1),
        2 => Some(BootStage::Bl2),
        31 => Some(BootStage::Bl31),
        32 => Some(BootStage::Bl32),
        _ => None,
    }
}

/// Why no hand-off table could be produced.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandoffError {
    #[error("{0} does not hand off to a later stage")]
    NoSuccessor(BootStage),
    #[error("{0} does not enter the non-secure world")]
    NotRuntime(BootStage),
    #[error("layout was validated for {layout}, not {stage}")]
    StageMismatch { layout: BootStage, stage: BootStage },
}

/// The table pool and memory map limits differ per stage, so a table must be
/// built from the layout of the stage that hands off.
fn check_stage(layout: &ValidatedLayout, stage: BootStage) -> Result<(), HandoffError> {
    if layout.stage() == stage {
        Ok(())
    } else {
        Err(HandoffError::StageMismatch {
            layout: layout.stage(),
            stage,
        })
    }
}

/// One region as seen across the hand-off boundary.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RegionTriple {
    pub base: u64,
    pub size: u64,
    /// Exclusive end, `base + size`.
    pub limit: u64,
    pub alignment: u64,
}

impl RegionTriple {
    #[must_use]
    pub const fn from_region(region: &Region) -> Self {
        Self {
            base: region.base().as_u64(),
            size: region.size().as_u64(),
            limit: region.limit().as_u64(),
            alignment: region.alignment(),
        }
    }

    /// A reserved window that is not a region of its own.
    #[must_use]
    pub const fn from_window(window: AddressRange, alignment: u64) -> Self {
        let base = window.base().as_u64();
        let size = window.size().as_u64();
        Self {
            base,
            size,
            limit: base.saturating_add(size),
            alignment,
        }
    }

    #[must_use]
    pub const fn range(&self) -> AddressRange {
        AddressRange::new(PhysicalAddress::new(self.base), ByteCount::new(self.size))
    }
}

impl From<&Region> for RegionTriple {
    fn from(region: &Region) -> Self {
        Self::from_region(region)
    }
}

/// Record passed from one boot stage to the next.
/// Keep this `#[repr(C)]`; fields are fixed-width integers only.
#[repr(C)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct HandoffTable {
    /// [`HANDOFF_MAGIC`].
    pub magic: u32,
    /// [`HANDOFF_VERSION`].
    pub version: u32,
    /// [`stage_tag`] of the stage that built the table.
    pub from_stage: u32,
    /// [`HandoffTarget::tag`] of the stage being entered.
    pub to_stage: u32,
    /// First instruction of the next stage, the base of its region.
    pub entry_point: u64,
    /// Region the next stage was loaded into.
    pub image: RegionTriple,
    pub translation_tables: RegionTriple,
    pub descriptors: RegionTriple,
    pub data: RegionTriple,
    /// Whole mailbox window; slot `i` is at `base + i * mailbox_stride`.
    pub mailbox_window: RegionTriple,
    pub mailbox_stride: u64,
    pub core_count: u32,
    pub reserved: u32,
}

const _: () = {
    assert!(size_of::<RegionTriple>() == 32);
    assert!(size_of::<HandoffTable>() == 200);
    assert!(align_of::<HandoffTable>() == 8);
};

impl HandoffTable {
    /// Table `stage` passes to the stage after it in the secure chain.
    ///
    /// # Errors
    /// - [`HandoffError::StageMismatch`] if `layout` was validated for another stage.
    /// - [`HandoffError::NoSuccessor`] for the last secure stage.
    pub fn for_stage(layout: &ValidatedLayout, stage: BootStage) -> Result<Self, HandoffError> {
        check_stage(layout, stage)?;
        let next = stage.next().ok_or(HandoffError::NoSuccessor(stage))?;
        Ok(Self::build(layout, stage, HandoffTarget::Stage(next)))
    }

    /// Table the runtime firmware passes when entering the non-secure payload.
    ///
    /// # Errors
    /// - [`HandoffError::StageMismatch`] if `layout` was validated for another stage.
    /// - [`HandoffError::NotRuntime`] unless `stage` is BL31.
    pub fn non_secure(layout: &ValidatedLayout, stage: BootStage) -> Result<Self, HandoffError> {
        check_stage(layout, stage)?;
        if stage != BootStage::Bl31 {
            return Err(HandoffError::NotRuntime(stage));
        }
        Ok(Self::build(layout, stage, HandoffTarget::NonSecure))
    }

    fn build(layout: &ValidatedLayout, from: BootStage, to: HandoffTarget) -> Self {
        let triple = |id| layout.region(id).map(RegionTriple::from).unwrap_or_default();
        let image = triple(to.region());
        let mailboxes = layout.mailboxes();

        Self {
            magic: HANDOFF_MAGIC,
            version: HANDOFF_VERSION,
            from_stage: stage_tag(from),
            to_stage: to.tag(),
            entry_point: image.base,
            image,
            translation_tables: triple(RegionId::TranslationTables),
            descriptors: triple(RegionId::DescriptorArea),
            data: triple(RegionId::DataArea),
            mailbox_window: RegionTriple::from_window(mailboxes.window(), mailboxes.stride()),
            mailbox_stride: mailboxes.stride(),
            core_count: layout.topology().core_count(),
            reserved: 0,
        }
    }

    /// Magic and version match this build.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.magic == HANDOFF_MAGIC && self.version == HANDOFF_VERSION
    }

    #[must_use]
    pub const fn entry_point(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.entry_point)
    }

    #[must_use]
    pub const fn source(&self) -> Option<BootStage> {
        stage_from_tag(self.from_stage)
    }

    #[must_use]
    pub const fn target(&self) -> Option<HandoffTarget> {
        HandoffTarget::from_tag(self.to_stage)
    }

    /// Mailbox of `core`, computed from the window and stride.
    #[must_use]
    pub fn mailbox(&self, core: u32) -> Option<PhysicalAddress> {
        if core >= self.core_count {
            return None;
        }
        match u64::from(core).checked_mul(self.mailbox_stride) {
            Some(offset) if offset < self.mailbox_window.size => {
                Some(PhysicalAddress::new(self.mailbox_window.base + offset))
            }
            _ => None,
        }
    }
}
