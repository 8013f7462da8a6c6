//! # Mailbox Placement
//!
//! Secondary cores wait in a loop polling their own mailbox for the entry
//! point the primary core writes there. A write to one mailbox must never
//! invalidate a line another core is spinning on, so every slot starts on its
//! own line of the *largest* cache level.

use crate::error::{InvalidRegion, MailboxOverflow};
use crate::region::{Region, RegionId};
use alloc::vec::Vec;
use firmware_addresses::{AddressRange, ByteCount, PhysicalAddress};
use firmware_platform::PlatformTopology;

/// The mailbox of one core.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MailboxSlot {
    core_index: u32,
    address: PhysicalAddress,
    size: ByteCount,
}

impl MailboxSlot {
    #[must_use]
    pub const fn core_index(&self) -> u32 {
        self.core_index
    }

    #[must_use]
    pub const fn address(&self) -> PhysicalAddress {
        self.address
    }

    #[must_use]
    pub const fn size(&self) -> ByteCount {
        self.size
    }

    /// The slot as a [`RegionId::Mailbox`] region aligned to its own size.
    pub fn to_region(&self, address_space_bits: u32) -> Result<Region, InvalidRegion> {
        Region::new(
            RegionId::Mailbox(self.core_index),
            self.address,
            self.size,
            self.size.as_u64(),
            address_space_bits,
        )
    }
}

/// One mailbox slot per core, `stride` bytes apart.
///
/// ```rust
/// use firmware_addresses::{AddressRange, ByteCount, PhysicalAddress};
/// use firmware_layout::MailboxTable;
/// use firmware_platform::{lcb, PlatformTopology};
///
/// let topology = PlatformTopology::new(lcb::topology_config()).unwrap();
/// let window = AddressRange::new(PhysicalAddress::new(0x2F_F000), ByteCount::kib(4));
/// let table = MailboxTable::place(&topology, window).unwrap();
///
/// assert_eq!(table.stride(), 64);
/// assert_eq!(table.address(5), Some(PhysicalAddress::new(0x2F_F140)));
/// assert_eq!(table.address(6), None);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MailboxTable {
    slots: Vec<MailboxSlot>,
    stride: u64,
    window: AddressRange,
}

impl MailboxTable {
    /// Place `topology.core_count()` slots at the start of `window`.
    ///
    /// The stride is the largest cache line size over all levels.
    pub fn place(topology: &PlatformTopology, window: AddressRange) -> Result<Self, MailboxOverflow> {
        let stride = topology.cache_line_size();
        let cores = topology.core_count();

        if !window.fits_in_bits(topology.address_space_bits()) {
            return Err(MailboxOverflow::WindowOutOfRange(window));
        }
        if !window.base().is_aligned(stride) {
            return Err(MailboxOverflow::UnalignedWindow {
                base: window.base(),
                stride,
            });
        }

        let required = u128::from(cores) * u128::from(stride);
        if required > u128::from(window.size().as_u64()) {
            return Err(MailboxOverflow::Capacity {
                cores,
                stride,
                required,
                reserved: window.size(),
            });
        }

        // The capacity check bounds every offset by the window size, and the
        // window itself fits the address space.
        let slots = (0..cores)
            .map(|core_index| MailboxSlot {
                core_index,
                address: PhysicalAddress::new(
                    window.base().as_u64() + u64::from(core_index) * stride,
                ),
                size: ByteCount::new(stride),
            })
            .collect();

        Ok(Self {
            slots,
            stride,
            window,
        })
    }

    /// Rebuild the table from already validated mailbox regions.
    pub(crate) fn from_regions<'a>(
        regions: impl Iterator<Item = &'a Region>,
        stride: u64,
        window: AddressRange,
    ) -> Self {
        let mut slots: Vec<MailboxSlot> = regions
            .filter_map(|r| match r.id() {
                RegionId::Mailbox(core_index) => Some(MailboxSlot {
                    core_index,
                    address: r.base(),
                    size: r.size(),
                }),
                _ => None,
            })
            .collect();
        slots.sort_unstable_by_key(MailboxSlot::core_index);
        Self {
            slots,
            stride,
            window,
        }
    }

    /// How many cores a window of this size can serve.
    #[must_use]
    pub const fn max_cores(window: AddressRange, stride: u64) -> u64 {
        if stride == 0 {
            return 0;
        }
        window.size().as_u64() / stride
    }

    /// Mailbox address of `core`, if the core exists.
    #[must_use]
    pub fn address(&self, core: u32) -> Option<PhysicalAddress> {
        self.slot(core).map(MailboxSlot::address)
    }

    #[must_use]
    pub fn slot(&self, core: u32) -> Option<&MailboxSlot> {
        self.slots.iter().find(|s| s.core_index == core)
    }

    #[must_use]
    pub fn slots(&self) -> &[MailboxSlot] {
        &self.slots
    }

    #[must_use]
    pub const fn stride(&self) -> u64 {
        self.stride
    }

    #[must_use]
    pub const fn window(&self) -> AddressRange {
        self.window
    }
}
