//! # Layout Derivation
//!
//! Chains every region's base off the previous region's limit (or a DRAM
//! offset) as an explicit, ordered pipeline. Each step only reads regions
//! placed by earlier steps.

use crate::error::{DerivationOverflow, InvalidRegion, LayoutError};
use crate::mailbox::MailboxTable;
use crate::plan::LayoutPlan;
use crate::region::{Region, RegionId, StageGranule};
use alloc::vec::Vec;
use firmware_addresses::{AddressRange, ByteCount, PhysicalAddress, TranslationGranule};
use firmware_platform::{BootStage, PlatformTopology, StageBudgets, StageLimits, TopologyError, lcb};
use log::debug;

/// Everything a derivation (and its validation) depends on.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LayoutConfig {
    pub topology: PlatformTopology,
    pub budgets: StageBudgets,
    /// Stage whose translation tables and memory map are being sized.
    pub stage: BootStage,
    pub limits: StageLimits,
}

impl LayoutConfig {
    #[must_use]
    pub const fn new(
        topology: PlatformTopology,
        budgets: StageBudgets,
        stage: BootStage,
        limits: StageLimits,
    ) -> Self {
        Self {
            topology,
            budgets,
            stage,
            limits,
        }
    }

    /// The LCB reference profile for `stage`.
    pub fn lcb(stage: BootStage) -> Result<Self, TopologyError> {
        let topology = PlatformTopology::new(lcb::topology_config())?;
        Ok(Self::new(
            topology,
            lcb::budgets(),
            stage,
            lcb::stage_limits(stage),
        ))
    }
}

/// Derive the full layout plan for `config`.
///
/// Steps, in order:
/// 1. BL1 RO at the reset vector
/// 2. BL1 RW after BL1 RO
/// 3. BL2 after BL1 RW, minus the reserved tail
/// 4. BL31 and BL32 together: BL32 is secure DRAM, BL31 ends where it starts
/// 5. I/O descriptor and data areas
/// 6. translation tables, sized by the stage's table count
/// 7. BL33 at the non-secure load address
/// 8. one mailbox slot per core
///
/// # Errors
/// - [`LayoutError::DerivationOverflow`] if an address computation wraps or
///   leaves the address space.
/// - [`LayoutError::InvalidRegion`] if a step yields an empty or misaligned
///   region.
/// - [`LayoutError::MailboxOverflow`] if the mailbox window is too small.
pub fn derive_layout(config: &LayoutConfig) -> Result<LayoutPlan, LayoutError> {
    let mut pipeline = Pipeline::new(config);

    let bl1_rom = pipeline.bl1_rom()?;
    let bl1_ram = pipeline.bl1_ram(&bl1_rom)?;
    pipeline.bl2(&bl1_ram)?;
    pipeline.secure_world()?;
    pipeline.io_areas()?;
    pipeline.translation_tables()?;
    pipeline.bl33()?;
    let window = pipeline.mailboxes()?;

    Ok(LayoutPlan::from_regions(pipeline.regions, window))
}

struct Pipeline<'a> {
    config: &'a LayoutConfig,
    regions: Vec<Region>,
}

impl<'a> Pipeline<'a> {
    fn new(config: &'a LayoutConfig) -> Self {
        Self {
            config,
            regions: Vec::with_capacity(RegionId::FIXED.len() + config.topology.core_count() as usize),
        }
    }

    const fn topology(&self) -> &PlatformTopology {
        &self.config.topology
    }

    const fn budgets(&self) -> &StageBudgets {
        &self.config.budgets
    }

    const fn bits(&self) -> u32 {
        self.config.topology.address_space_bits()
    }

    fn dram_base(&self) -> PhysicalAddress {
        self.topology().dram().base()
    }

    /// `from + by`, provided the result is addressable.
    fn advance(
        &self,
        region: RegionId,
        from: PhysicalAddress,
        by: ByteCount,
        operation: &'static str,
    ) -> Result<PhysicalAddress, DerivationOverflow> {
        let range = AddressRange::new(from, by);
        match range.end() {
            Some(end) if range.fits_in_bits(self.bits()) => Ok(end),
            _ => Err(DerivationOverflow {
                region,
                operation,
                bits: self.bits(),
            }),
        }
    }

    fn place(
        &mut self,
        id: RegionId,
        base: PhysicalAddress,
        size: ByteCount,
        operation: &'static str,
    ) -> Result<Region, LayoutError> {
        self.advance(id, base, size, operation)?;
        let region = Region::new(
            id,
            base,
            size,
            id.required_alignment(self.topology()),
            self.bits(),
        )?;
        debug!("derived {region}");
        self.regions.push(region);
        Ok(region)
    }

    fn bl1_rom(&mut self) -> Result<Region, LayoutError> {
        let base = self.topology().reset_vector();
        let size = self.budgets().bl1_ro_size;
        self.place(RegionId::Bl1Rom, base, size, "BL1 RO size")
    }

    fn bl1_ram(&mut self, bl1_rom: &Region) -> Result<Region, LayoutError> {
        let id = RegionId::Bl1Ram;
        let base = self.advance(id, bl1_rom.limit(), self.budgets().bl1_rw_offset, "BL1 RW offset")?;
        let size = self.budgets().bl1_rw_size;
        self.place(id, base, size, "BL1 RW size")
    }

    fn bl2(&mut self, bl1_ram: &Region) -> Result<Region, LayoutError> {
        let id = RegionId::Bl2;
        let budgets = *self.budgets();
        let base = self.advance(id, bl1_ram.limit(), budgets.bl2_offset, "BL2 offset")?;
        self.advance(id, base, budgets.bl2_size, "BL2 size")?;

        let size = budgets
            .bl2_size
            .checked_sub(budgets.bl2_reserved_tail)
            .ok_or(InvalidRegion::ZeroSize { id })?;
        self.place(id, base, size, "BL2 size")
    }

    /// BL31 and BL32 are placed together: BL31's limit is BL32's base.
    fn secure_world(&mut self) -> Result<(Region, Region), LayoutError> {
        let secure = self.topology().secure_dram();
        let bl31_base = self.advance(
            RegionId::Bl31,
            self.dram_base(),
            self.budgets().bl31_offset,
            "BL31 offset",
        )?;
        let bl31_size = secure
            .base()
            .offset_from(bl31_base)
            .ok_or(InvalidRegion::ZeroSize { id: RegionId::Bl31 })?;

        let bl31 = self.place(RegionId::Bl31, bl31_base, bl31_size, "BL31 size")?;
        let bl32 = self.place(RegionId::Bl32, secure.base(), secure.size(), "secure DRAM size")?;
        Ok((bl31, bl32))
    }

    fn io_areas(&mut self) -> Result<(Region, Region), LayoutError> {
        let budgets = *self.budgets();
        let base = self.advance(
            RegionId::DescriptorArea,
            self.dram_base(),
            budgets.descriptor_offset,
            "descriptor offset",
        )?;
        let descriptors = self.place(
            RegionId::DescriptorArea,
            base,
            budgets.descriptor_size,
            "descriptor size",
        )?;
        let data = self.place(
            RegionId::DataArea,
            descriptors.limit(),
            budgets.data_size,
            "data size",
        )?;
        Ok((descriptors, data))
    }

    fn translation_tables(&mut self) -> Result<Region, LayoutError> {
        let id = RegionId::TranslationTables;
        let size = ByteCount::new(StageGranule::SIZE)
            .checked_mul(u64::from(self.config.limits.max_xlat_tables))
            .ok_or(DerivationOverflow {
                region: id,
                operation: "table count × granule",
                bits: self.bits(),
            })?;
        let base = self.advance(id, self.dram_base(), self.budgets().xlat_offset, "table offset")?;
        self.place(id, base, size, "table pool size")
    }

    fn bl33(&mut self) -> Result<Region, LayoutError> {
        let id = RegionId::Bl33;
        let base = self.advance(
            id,
            self.dram_base(),
            self.budgets().ns_image_offset,
            "non-secure image offset",
        )?;
        let size = self.budgets().bl33_size;
        self.place(id, base, size, "BL33 size")
    }

    /// Returns the reserved mailbox window.
    fn mailboxes(&mut self) -> Result<AddressRange, LayoutError> {
        let budgets = *self.budgets();
        let base = self.advance(
            RegionId::Mailbox(0),
            self.dram_base(),
            budgets.mailbox_offset,
            "mailbox offset",
        )?;
        let window = AddressRange::new(base, budgets.mailbox_reserved_size);

        let table = MailboxTable::place(self.topology(), window)?;
        for slot in table.slots() {
            let region = slot.to_region(self.bits())?;
            debug!("derived {region}");
            self.regions.push(region);
        }
        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lcb(stage: BootStage) -> LayoutConfig {
        LayoutConfig::lcb(stage).unwrap()
    }

    fn base(plan: &LayoutPlan, id: RegionId) -> u64 {
        plan.get(id).unwrap().base().as_u64()
    }

    fn limit(plan: &LayoutPlan, id: RegionId) -> u64 {
        plan.get(id).unwrap().limit().as_u64()
    }

    #[test]
    fn lcb_chain() {
        let plan = derive_layout(&lcb(BootStage::Bl1)).unwrap();

        assert_eq!(base(&plan, RegionId::Bl1Rom), 0x2000);
        assert_eq!(limit(&plan, RegionId::Bl1Rom), 0x1_8000);
        assert_eq!(base(&plan, RegionId::Bl1Ram), 0x1_8000);
        assert_eq!(base(&plan, RegionId::Bl2), 0x19_8000);
        assert_eq!(limit(&plan, RegionId::Bl2), 0x25_8000);
        assert_eq!(base(&plan, RegionId::Bl31), 0x30_0000);
        assert_eq!(limit(&plan, RegionId::Bl31), base(&plan, RegionId::Bl32));
        assert_eq!(limit(&plan, RegionId::DescriptorArea), base(&plan, RegionId::DataArea));
        assert_eq!(base(&plan, RegionId::Bl33), 0x200_0000);
        assert_eq!(plan.len(), RegionId::FIXED.len() + 6);
    }

    #[test]
    fn table_pool_follows_stage() {
        let bl31 = derive_layout(&lcb(BootStage::Bl31)).unwrap();
        let bl2 = derive_layout(&lcb(BootStage::Bl2)).unwrap();
        let size = |plan: &LayoutPlan| plan.get(RegionId::TranslationTables).unwrap().size().as_u64();
        assert_eq!(size(&bl31), 2 * 0x1000);
        assert_eq!(size(&bl2), 3 * 0x1000);
    }

    #[test]
    fn reserved_tail_swallowing_bl2_is_rejected() {
        let mut config = lcb(BootStage::Bl2);
        config.budgets.set_bl2_reserved_tail(config.budgets.bl2_size);
        assert_eq!(
            derive_layout(&config),
            Err(LayoutError::InvalidRegion(InvalidRegion::ZeroSize { id: RegionId::Bl2 }))
        );
    }

    #[test]
    fn secure_dram_below_runtime_is_rejected() {
        let mut config = lcb(BootStage::Bl31);
        config.budgets.set_bl31_offset(ByteCount::new(0x50_0000));
        assert_eq!(
            derive_layout(&config),
            Err(LayoutError::InvalidRegion(InvalidRegion::ZeroSize { id: RegionId::Bl31 }))
        );
    }

    #[test]
    fn misaligned_chain_is_rejected() {
        let mut config = lcb(BootStage::Bl1);
        config.budgets.set_bl1_ro_size(ByteCount::new(0x1_6100));
        assert!(matches!(
            derive_layout(&config),
            Err(LayoutError::InvalidRegion(InvalidRegion::Misaligned {
                id: RegionId::Bl1Ram,
                ..
            }))
        ));
    }
}
