//! # Secure Boot Chain Memory Layout
//!
//! Derives and validates the physical memory map shared by every stage of the
//! boot chain: where each stage is loaded, where the I/O buffers, translation
//! tables and per-core mailboxes live, and whether all of it fits.
//!
//! ## Overview
//!
//! | Item | Module | Description |
//! |------|--------|-------------|
//! | [`Region`], [`RegionId`] | [`region`] | One named, aligned address range. |
//! | [`RegionAttributes`] | [`attributes`] | Mapping attributes, used to coalesce memory map entries. |
//! | [`derive_layout`] | [`derive`] | Ordered pipeline producing a [`LayoutPlan`]. |
//! | [`validate`] | [`validate`](mod@validate) | Exhaustive whole-plan checks producing a [`ValidatedLayout`]. |
//! | [`MailboxTable`] | [`mailbox`] | One cache-line isolated mailbox per core. |
//! | [`publish`] | [`published`] | Init-once, lock-free shared layout. |
//!
//! ## Lifecycle
//!
//! ```text
//! TopologyConfig ──► PlatformTopology ─┐
//! StageBudgets ────────────────────────┼─► derive_layout ──► LayoutPlan ──► validate ──► ValidatedLayout ──► publish
//! StageLimits (per BootStage) ─────────┘
//! ```
//!
//! ```rust
//! use firmware_layout::{build_layout, LayoutConfig, RegionId};
//! use firmware_platform::BootStage;
//!
//! let config = LayoutConfig::lcb(BootStage::Bl2).unwrap();
//! let layout = build_layout(&config).unwrap();
//!
//! let bl31 = layout.region(RegionId::Bl31).unwrap();
//! let bl32 = layout.region(RegionId::Bl32).unwrap();
//! assert_eq!(bl31.limit(), bl32.base());
//! assert_eq!(layout.hand_off_address(BootStage::Bl31), bl31.base());
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod attributes;
pub mod derive;
pub mod error;
pub mod mailbox;
pub mod plan;
pub mod published;
pub mod region;
pub mod validate;

pub use attributes::{MemoryType, RegionAttributes};
pub use derive::{LayoutConfig, derive_layout};
pub use error::{
    DerivationOverflow, InvalidRegion, LayoutError, LayoutViolation, MailboxOverflow, Violation,
};
pub use mailbox::{MailboxSlot, MailboxTable};
pub use plan::LayoutPlan;
pub use published::{publish, publish_with, published};
pub use region::{AlignmentClass, Region, RegionId, StageGranule};
pub use validate::{ValidatedLayout, validate};

/// Derive the layout for `config` and validate it.
///
/// # Errors
/// Any derivation error, or every violation the validator found.
pub fn build_layout(config: &LayoutConfig) -> Result<ValidatedLayout, LayoutError> {
    let plan = derive_layout(config)?;
    Ok(validate(plan, config)?)
}
