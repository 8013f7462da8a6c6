//! # Boot Stages
//!
//! The tag used to select per-stage limits, instead of building each stage
//! with a different set of conditionally compiled constants.

use crate::BootImage;
use core::fmt;

/// A boot stage that builds its own translation tables.
///
/// The non-secure payload (BL33) is deliberately absent: it is loaded and
/// entered by this chain, but never maps memory through it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum BootStage {
    /// Immutable first-stage loader, runs from the trusted ROM window.
    Bl1,
    /// Trusted boot firmware, second-stage loader.
    Bl2,
    /// EL3 runtime firmware (secure monitor).
    Bl31,
    /// Secure payload (trusted OS).
    Bl32,
}

impl BootStage {
    pub const ALL: [Self; 4] = [Self::Bl1, Self::Bl2, Self::Bl31, Self::Bl32];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bl1 => "bl1",
            Self::Bl2 => "bl2",
            Self::Bl31 => "bl31",
            Self::Bl32 => "bl32",
        }
    }

    /// The image this stage is loaded from.
    #[must_use]
    pub const fn image(self) -> BootImage {
        match self {
            Self::Bl1 => BootImage::Bl1,
            Self::Bl2 => BootImage::Bl2,
            Self::Bl31 => BootImage::Bl31,
            Self::Bl32 => BootImage::Bl32,
        }
    }

    /// The stage control is handed to when this one finishes.
    ///
    /// BL31 hands off to BL32 first; the non-secure payload is entered by
    /// BL31 afterwards and is not a [`BootStage`]. BL32 returns to BL31.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Bl1 => Some(Self::Bl2),
            Self::Bl2 => Some(Self::Bl31),
            Self::Bl31 => Some(Self::Bl32),
            Self::Bl32 => None,
        }
    }

    /// Parse a stage name as printed by [`as_str`](Self::as_str).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for BootStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping budget of one boot stage.
///
/// Early stages need fewer simultaneous mappings than the runtime stage; the
/// translation table builder of each stage is sized accordingly.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct StageLimits {
    /// Number of translation tables the stage reserves.
    pub max_xlat_tables: u32,
    /// Number of distinct memory map entries the stage can describe.
    pub max_mmap_regions: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_order() {
        let mut stage = BootStage::Bl1;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            seen.push(next);
            stage = next;
        }
        assert_eq!(seen, BootStage::ALL);
    }

    #[test]
    fn parse_names() {
        assert_eq!(BootStage::from_name("bl31"), Some(BootStage::Bl31));
        assert_eq!(BootStage::from_name("BL2"), Some(BootStage::Bl2));
        assert_eq!(BootStage::from_name("bl33"), None);
        for stage in BootStage::ALL {
            assert_eq!(BootStage::from_name(stage.as_str()), Some(stage));
        }
    }
}
