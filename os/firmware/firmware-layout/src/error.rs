use crate::region::RegionId;
use alloc::vec::Vec;
use core::fmt;
use firmware_addresses::{AddressRange, ByteCount, PhysicalAddress};
use firmware_platform::{BootStage, TopologyError};

/// A single region violates its own invariants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRegion {
    #[error("region {id} has zero size")]
    ZeroSize { id: RegionId },
    #[error("region {id}: alignment {alignment:#x} is not a power of two")]
    BadAlignment { id: RegionId, alignment: u64 },
    #[error("region {id}: base {base} is not aligned to {alignment:#x}")]
    Misaligned {
        id: RegionId,
        base: PhysicalAddress,
        alignment: u64,
    },
    #[error("region {id}: {base} + {size} exceeds the {bits}-bit address space")]
    ExceedsAddressSpace {
        id: RegionId,
        base: PhysicalAddress,
        size: ByteCount,
        bits: u32,
    },
}

/// Address arithmetic of a derivation step overflowed the address width.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("deriving {region}: {operation} overflows the {bits}-bit address space")]
pub struct DerivationOverflow {
    pub region: RegionId,
    pub operation: &'static str,
    pub bits: u32,
}

/// The mailbox window cannot hold one cache-line isolated slot per core.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailboxOverflow {
    #[error("{cores} mailboxes of stride {stride:#x} need {required:#x} bytes, window holds {reserved}")]
    Capacity {
        cores: u32,
        stride: u64,
        required: u128,
        reserved: ByteCount,
    },
    #[error("mailbox window base {base} is not aligned to the stride {stride:#x}")]
    UnalignedWindow { base: PhysicalAddress, stride: u64 },
    #[error("mailbox window {0} exceeds the address space")]
    WindowOutOfRange(AddressRange),
}

/// One broken whole-plan invariant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Violation {
    Overlap {
        first: RegionId,
        second: RegionId,
    },
    OutOfEnvelope {
        region: RegionId,
        range: AddressRange,
    },
    Misaligned {
        region: RegionId,
        address: PhysicalAddress,
        required: u64,
    },
    /// The recorded alignment is weaker than the id requires.
    WeakAlignment {
        region: RegionId,
        declared: u64,
        required: u64,
    },
    MappingBudgetExceeded {
        stage: BootStage,
        required: u32,
        max: u32,
    },
    TranslationTablesTooSmall {
        stage: BootStage,
        required: ByteCount,
        actual: ByteCount,
    },
    MissingRegion(RegionId),
    DuplicateRegion(RegionId),
    /// A mailbox for a core the topology does not have.
    UnexpectedRegion(RegionId),
    MailboxOutsideWindow {
        core: u32,
    },
    MailboxSlotSize {
        core: u32,
        size: ByteCount,
        required: u64,
    },
    /// A non-mailbox region intrudes into the mailbox window.
    MailboxWindowOverlap {
        region: RegionId,
    },
    /// A region intrudes into the space held back after BL2.
    ReservedTailOverlap {
        region: RegionId,
        tail: AddressRange,
    },
    /// An I/O area does not end below the non-secure load address.
    IoAreaAboveNsImage {
        region: RegionId,
        ns_entry: PhysicalAddress,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overlap { first, second } => write!(f, "{first} overlaps {second}"),
            Self::OutOfEnvelope { region, range } => {
                write!(f, "{region} {range} lies outside DRAM and the ROM window")
            }
            Self::Misaligned {
                region,
                address,
                required,
            } => write!(f, "{region}: {address} is not aligned to {required:#x}"),
            Self::WeakAlignment {
                region,
                declared,
                required,
            } => write!(
                f,
                "{region}: declared alignment {declared:#x} is weaker than {required:#x}"
            ),
            Self::MappingBudgetExceeded {
                stage,
                required,
                max,
            } => write!(
                f,
                "{stage} maps {required} regions, at most {max} memory map entries available"
            ),
            Self::TranslationTablesTooSmall {
                stage,
                required,
                actual,
            } => write!(
                f,
                "{stage} needs {required} of translation tables, {actual} reserved"
            ),
            Self::MissingRegion(id) => write!(f, "{id} is missing from the plan"),
            Self::DuplicateRegion(id) => write!(f, "{id} appears more than once"),
            Self::UnexpectedRegion(id) => write!(f, "{id} does not belong to this topology"),
            Self::MailboxOutsideWindow { core } => {
                write!(f, "mailbox of core {core} lies outside the mailbox window")
            }
            Self::MailboxSlotSize {
                core,
                size,
                required,
            } => write!(
                f,
                "mailbox of core {core} is {size}, slots must be {required:#x} bytes"
            ),
            Self::MailboxWindowOverlap { region } => {
                write!(f, "{region} overlaps the mailbox window")
            }
            Self::ReservedTailOverlap { region, tail } => {
                write!(f, "{region} intrudes into the reserved tail {tail} after bl2")
            }
            Self::IoAreaAboveNsImage { region, ns_entry } => {
                write!(f, "{region} must end at or below the non-secure load address {ns_entry}")
            }
        }
    }
}

/// Every violation found while validating a plan for one stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} layout violation(s) for {stage}", .violations.len())]
pub struct LayoutViolation {
    pub stage: BootStage,
    pub violations: Vec<Violation>,
}

impl LayoutViolation {
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

/// Anything that stops a layout from being built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("invalid topology: {0}")]
    InvalidTopology(#[from] TopologyError),
    #[error(transparent)]
    InvalidRegion(#[from] InvalidRegion),
    #[error(transparent)]
    DerivationOverflow(#[from] DerivationOverflow),
    #[error(transparent)]
    LayoutViolation(#[from] LayoutViolation),
    #[error(transparent)]
    MailboxOverflow(#[from] MailboxOverflow),
}
