//! # Layout Validation
//!
//! Checks every whole-plan invariant for one boot stage and reports all
//! violations at once, so a broken configuration is fixed in one iteration
//! instead of one error per boot attempt.

use crate::derive::LayoutConfig;
use crate::error::{LayoutViolation, Violation};
use crate::mailbox::MailboxTable;
use crate::plan::LayoutPlan;
use crate::region::{AlignmentClass, Region, RegionId, StageGranule};
use alloc::vec::Vec;
use firmware_addresses::{AddressRange, ByteCount, PhysicalAddress, TranslationGranule};
use firmware_platform::{BootStage, PlatformTopology, StageLimits};
use log::{error, info};

/// A plan that passed [`validate`]. The only input accepted by hand-off and
/// linker symbol generation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidatedLayout {
    plan: LayoutPlan,
    fixed: FixedRegions,
    mailboxes: MailboxTable,
    topology: PlatformTopology,
    stage: BootStage,
    limits: StageLimits,
    reserved_tail: AddressRange,
}

/// Every non-per-core region, resolved once.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct FixedRegions {
    bl1_rom: Region,
    bl1_ram: Region,
    bl2: Region,
    bl31: Region,
    bl32: Region,
    bl33: Region,
    descriptors: Region,
    data: Region,
    tables: Region,
}

impl FixedRegions {
    fn resolve(plan: &LayoutPlan) -> Option<Self> {
        Some(Self {
            bl1_rom: *plan.get(RegionId::Bl1Rom)?,
            bl1_ram: *plan.get(RegionId::Bl1Ram)?,
            bl2: *plan.get(RegionId::Bl2)?,
            bl31: *plan.get(RegionId::Bl31)?,
            bl32: *plan.get(RegionId::Bl32)?,
            bl33: *plan.get(RegionId::Bl33)?,
            descriptors: *plan.get(RegionId::DescriptorArea)?,
            data: *plan.get(RegionId::DataArea)?,
            tables: *plan.get(RegionId::TranslationTables)?,
        })
    }

    const fn get(&self, id: RegionId) -> Option<&Region> {
        match id {
            RegionId::Bl1Rom => Some(&self.bl1_rom),
            RegionId::Bl1Ram => Some(&self.bl1_ram),
            RegionId::Bl2 => Some(&self.bl2),
            RegionId::Bl31 => Some(&self.bl31),
            RegionId::Bl32 => Some(&self.bl32),
            RegionId::Bl33 => Some(&self.bl33),
            RegionId::DescriptorArea => Some(&self.descriptors),
            RegionId::DataArea => Some(&self.data),
            RegionId::TranslationTables => Some(&self.tables),
            RegionId::Mailbox(_) => None,
        }
    }

    const fn stage(&self, stage: BootStage) -> &Region {
        match stage {
            BootStage::Bl1 => &self.bl1_rom,
            BootStage::Bl2 => &self.bl2,
            BootStage::Bl31 => &self.bl31,
            BootStage::Bl32 => &self.bl32,
        }
    }
}

impl ValidatedLayout {
    #[must_use]
    pub const fn plan(&self) -> &LayoutPlan {
        &self.plan
    }

    /// Region by id; `None` only for mailboxes of cores that do not exist.
    #[must_use]
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.fixed.get(id).or_else(|| self.plan.get(id))
    }

    /// Region `stage` is loaded into.
    #[must_use]
    pub const fn stage_region(&self, stage: BootStage) -> &Region {
        self.fixed.stage(stage)
    }

    /// Address control is transferred to when entering `stage`.
    #[must_use]
    pub const fn hand_off_address(&self, stage: BootStage) -> PhysicalAddress {
        self.fixed.stage(stage).base()
    }

    /// Load address of the non-secure payload.
    #[must_use]
    pub const fn ns_entry_point(&self) -> PhysicalAddress {
        self.fixed.bl33.base()
    }

    #[must_use]
    pub const fn mailboxes(&self) -> &MailboxTable {
        &self.mailboxes
    }

    #[must_use]
    pub const fn topology(&self) -> &PlatformTopology {
        &self.topology
    }

    /// Stage the layout was validated for.
    #[must_use]
    pub const fn stage(&self) -> BootStage {
        self.stage
    }

    #[must_use]
    pub const fn limits(&self) -> StageLimits {
        self.limits
    }

    /// Space after BL2 held back for higher-privileged firmware.
    #[must_use]
    pub const fn reserved_tail(&self) -> AddressRange {
        self.reserved_tail
    }

    /// Memory map entries the stage needs for this layout.
    #[must_use]
    pub fn mapping_count(&self) -> u32 {
        mapping_count(&self.plan, self.stage)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Region> {
        self.plan.iter()
    }
}

/// Check `plan` against every layout invariant for `config.stage`.
///
/// Never stops at the first problem: all violations are logged and returned.
///
/// # Errors
/// [`LayoutViolation`] listing every violation found.
pub fn validate(plan: LayoutPlan, config: &LayoutConfig) -> Result<ValidatedLayout, LayoutViolation> {
    let topology = &config.topology;
    let mut violations = Vec::new();

    check_presence(&plan, topology, &mut violations);
    check_overlaps(&plan, &mut violations);
    check_envelope(&plan, topology, &mut violations);
    check_alignment(&plan, topology, &mut violations);
    check_mapping_budget(&plan, config, &mut violations);
    check_mailboxes(&plan, topology, &mut violations);
    let reserved_tail = check_reserved_tail(&plan, config, &mut violations);
    check_io_areas(&plan, &mut violations);

    let fixed = match FixedRegions::resolve(&plan) {
        Some(fixed) if violations.is_empty() => fixed,
        _ => {
            for violation in &violations {
                error!("{}: {violation}", config.stage);
            }
            return Err(LayoutViolation {
                stage: config.stage,
                violations,
            });
        }
    };

    let mailboxes = MailboxTable::from_regions(
        plan.mailboxes(),
        topology.cache_line_size(),
        plan.mailbox_window(),
    );
    info!(
        "{} layout valid: {} regions, {} of {} memory map entries",
        config.stage,
        plan.len(),
        mapping_count(&plan, config.stage),
        config.limits.max_mmap_regions
    );

    Ok(ValidatedLayout {
        plan,
        fixed,
        mailboxes,
        topology: *topology,
        stage: config.stage,
        limits: config.limits,
        reserved_tail,
    })
}

/// (presence) every fixed region and one mailbox per core, exactly once.
fn check_presence(plan: &LayoutPlan, topology: &PlatformTopology, out: &mut Vec<Violation>) {
    let expected = RegionId::FIXED
        .into_iter()
        .chain((0..topology.core_count()).map(RegionId::Mailbox));
    for id in expected {
        match plan.iter().filter(|r| r.id() == id).count() {
            0 => out.push(Violation::MissingRegion(id)),
            1 => {}
            _ => out.push(Violation::DuplicateRegion(id)),
        }
    }

    for region in plan.mailboxes() {
        if let RegionId::Mailbox(core) = region.id()
            && core >= topology.core_count()
        {
            out.push(Violation::UnexpectedRegion(region.id()));
        }
    }
}

/// (a) pairwise disjointness; every overlapping pair is reported.
fn check_overlaps(plan: &LayoutPlan, out: &mut Vec<Violation>) {
    let regions = plan.regions();
    for (i, first) in regions.iter().enumerate() {
        for second in &regions[i + 1..] {
            if first.overlaps(second) {
                out.push(Violation::Overlap {
                    first: first.id(),
                    second: second.id(),
                });
            }
        }
    }
}

/// (b) inside DRAM, or inside the ROM window for first-stage regions.
fn check_envelope(plan: &LayoutPlan, topology: &PlatformTopology, out: &mut Vec<Violation>) {
    for region in plan {
        let range = region.range();
        let in_dram = topology.dram().contains_range(&range);
        let in_rom = region.id().is_first_stage() && topology.rom().contains_range(&range);
        if !in_dram && !in_rom {
            out.push(Violation::OutOfEnvelope {
                region: region.id(),
                range,
            });
        }
    }
}

/// (c) base alignment, limit alignment for granule regions, declared strength.
fn check_alignment(plan: &LayoutPlan, topology: &PlatformTopology, out: &mut Vec<Violation>) {
    for region in plan {
        let id = region.id();
        let required = id.required_alignment(topology);

        if region.alignment() < required {
            out.push(Violation::WeakAlignment {
                region: id,
                declared: region.alignment(),
                required,
            });
        }
        if !region.base().is_aligned(required) {
            out.push(Violation::Misaligned {
                region: id,
                address: region.base(),
                required,
            });
        }
        if id.alignment_class() == AlignmentClass::Granule && !region.limit().is_aligned(required) {
            out.push(Violation::Misaligned {
                region: id,
                address: region.limit(),
                required,
            });
        }
    }
}

/// (d) memory map entries and translation table pool of the stage.
fn check_mapping_budget(plan: &LayoutPlan, config: &LayoutConfig, out: &mut Vec<Violation>) {
    let stage = config.stage;
    let limits = config.limits;

    let required = mapping_count(plan, stage);
    if required > limits.max_mmap_regions {
        out.push(Violation::MappingBudgetExceeded {
            stage,
            required,
            max: limits.max_mmap_regions,
        });
    }

    if let Some(tables) = plan.get(RegionId::TranslationTables) {
        let required = u128::from(StageGranule::SIZE) * u128::from(limits.max_xlat_tables);
        if u128::from(tables.size().as_u64()) < required {
            out.push(Violation::TranslationTablesTooSmall {
                stage,
                required: ByteCount::new(u64::try_from(required).unwrap_or(u64::MAX)),
                actual: tables.size(),
            });
        }
    }
}

/// (e) mailbox slots inside their window, one stride each, window kept clear.
fn check_mailboxes(plan: &LayoutPlan, topology: &PlatformTopology, out: &mut Vec<Violation>) {
    let window = plan.mailbox_window();
    let stride = topology.cache_line_size();

    for region in plan {
        match region.id() {
            RegionId::Mailbox(core) => {
                if region.size().as_u64() != stride {
                    out.push(Violation::MailboxSlotSize {
                        core,
                        size: region.size(),
                        required: stride,
                    });
                }
                if !window.contains_range(&region.range()) {
                    out.push(Violation::MailboxOutsideWindow { core });
                }
            }
            id => {
                if region.range().overlaps(&window) {
                    out.push(Violation::MailboxWindowOverlap { region: id });
                }
            }
        }
    }
}

/// (f) nothing placed in `[Bl2.limit, Bl2.limit + bl2_reserved_tail)`.
///
/// Returns the tail; empty if the plan has no BL2.
fn check_reserved_tail(
    plan: &LayoutPlan,
    config: &LayoutConfig,
    out: &mut Vec<Violation>,
) -> AddressRange {
    let Some(bl2) = plan.get(RegionId::Bl2) else {
        return AddressRange::default();
    };
    let tail = AddressRange::new(bl2.limit(), config.budgets.bl2_reserved_tail);
    for region in plan {
        if region.id() != RegionId::Bl2 && region.range().overlaps(&tail) {
            out.push(Violation::ReservedTailOverlap {
                region: region.id(),
                tail,
            });
        }
    }
    tail
}

/// (g) descriptor and data areas end at or below the non-secure load address.
fn check_io_areas(plan: &LayoutPlan, out: &mut Vec<Violation>) {
    let Some(bl33) = plan.get(RegionId::Bl33) else {
        return;
    };
    for id in [RegionId::DescriptorArea, RegionId::DataArea] {
        if let Some(area) = plan.get(id)
            && area.limit() > bl33.base()
        {
            out.push(Violation::IoAreaAboveNsImage {
                region: id,
                ns_entry: bl33.base(),
            });
        }
    }
}

/// Regions `stage` maps, counting adjacent regions with equal attributes once.
fn mapping_count(plan: &LayoutPlan, stage: BootStage) -> u32 {
    let mut mapped: Vec<&Region> = plan.iter().filter(|r| r.id().is_mapped_by(stage)).collect();
    mapped.sort_unstable_by_key(|r| (r.base(), r.id()));

    let mut count = 0u32;
    let mut previous: Option<&Region> = None;
    for region in mapped {
        let merges = previous.is_some_and(|p| {
            p.limit() == region.base() && p.id().attributes() == region.id().attributes()
        });
        if !merges {
            count += 1;
        }
        previous = Some(region);
    }
    count
}
