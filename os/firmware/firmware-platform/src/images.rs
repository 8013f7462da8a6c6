//! # Boot Image Catalog

use core::fmt;

/// Banner printed by the first stage on the diagnostic channel.
pub const FIRMWARE_WELCOME_STR: &str = "Booting Trusted Firmware\n";

/// Name of the first stage's memory descriptor.
pub const BL1_MEM_NAME: &str = "bl1_mem";

/// Output format handed to the linker for every stage.
pub const LINKER_FORMAT: &str = "elf64-littleaarch64";

/// Output architecture handed to the linker for every stage.
pub const LINKER_ARCH: &str = "aarch64";

/// An image loaded (or executed in place) by the boot chain.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BootImage {
    Bl1,
    /// Trusted boot firmware.
    Bl2,
    /// System control processor firmware. Loaded into the SCP, never into the
    /// application processor's memory map.
    Bl30,
    /// EL3 runtime firmware.
    Bl31,
    /// Secure payload (trusted OS).
    Bl32,
    /// Non-trusted firmware, e.g. UEFI.
    Bl33,
    /// Firmware image package wrapping the images above.
    Fip,
}

impl BootImage {
    pub const ALL: [Self; 7] = [
        Self::Bl1,
        Self::Bl2,
        Self::Bl30,
        Self::Bl31,
        Self::Bl32,
        Self::Bl33,
        Self::Fip,
    ];

    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Bl1 => "bl1.bin",
            Self::Bl2 => "bl2.bin",
            Self::Bl30 => "bl30.bin",
            Self::Bl31 => "bl31.bin",
            Self::Bl32 => "bl32.bin",
            Self::Bl33 => "bl33.bin",
            Self::Fip => "fip.bin",
        }
    }
}

impl fmt::Display for BootImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}
