use firmware_addresses::{AddressRange, ByteCount, PhysicalAddress};
use firmware_layout::{
    AlignmentClass, DerivationOverflow, LayoutConfig, LayoutError, LayoutPlan, MailboxTable,
    Region, RegionId, Violation, build_layout, derive_layout, validate,
};
use firmware_platform::{BootStage, CacheGeometry, PlatformTopology, lcb};

fn config_with(cores: u32, secure_base: u64, lines: &[u64], stage: BootStage) -> LayoutConfig {
    let topology = lcb::topology_config()
        .with_core_count(cores)
        .with_cluster_count(cores.min(lcb::CLUSTER_COUNT))
        .with_cache(CacheGeometry::from_line_sizes(lines).unwrap())
        .with_secure_dram(AddressRange::new(
            PhysicalAddress::new(secure_base),
            ByteCount::new(0x80_0000 - secure_base),
        ));
    LayoutConfig::new(
        PlatformTopology::new(topology).unwrap(),
        lcb::budgets(),
        stage,
        lcb::stage_limits(stage),
    )
}

fn sweep() -> impl Iterator<Item = LayoutConfig> {
    let max_cores = 64;
    (1..=max_cores).flat_map(|cores| {
        (4..=7u64).flat_map(move |mib| {
            BootStage::ALL
                .into_iter()
                .map(move |stage| config_with(cores, mib * 0x10_0000, &[64, 64], stage))
        })
    })
}

#[test]
fn valid_topologies_never_overlap() {
    for config in sweep() {
        let layout = build_layout(&config).unwrap();
        let regions = layout.plan().regions();
        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                assert!(!a.overlaps(b), "{a} overlaps {b}");
            }
        }
        assert_eq!(
            layout.region(RegionId::Bl31).unwrap().limit(),
            layout.region(RegionId::Bl32).unwrap().base()
        );
    }
}

#[test]
fn granule_regions_are_granule_aligned() {
    for config in sweep() {
        let plan = derive_layout(&config).unwrap();
        for region in &plan {
            if region.id().alignment_class() == AlignmentClass::Granule {
                assert!(region.base().is_aligned(0x1000), "{region}");
                assert!(region.limit().is_aligned(0x1000), "{region}");
            } else {
                assert!(region.base().is_aligned(64), "{region}");
            }
        }
    }
}

#[test]
fn mailbox_slots_never_share_a_line() {
    for lines in [&[64u64, 64][..], &[32, 64, 128][..]] {
        let stride = *lines.iter().max().unwrap();
        let window = AddressRange::new(PhysicalAddress::new(0x2F_F000), ByteCount::kib(4));
        let max = u32::try_from(MailboxTable::max_cores(window, stride)).unwrap();

        for cores in 1..=max {
            let layout = build_layout(&config_with(cores, 0x40_0000, lines, BootStage::Bl31)).unwrap();
            let slots = layout.mailboxes().slots();
            assert_eq!(slots.len(), cores as usize);
            for pair in slots.windows(2) {
                let gap = pair[1].address().as_u64() - pair[0].address().as_u64();
                assert!(gap >= stride);
            }
            for slot in slots {
                assert!(slot.address().is_aligned(stride));
            }
        }

        // one core past the window is a placement error, not a silent overlap
        let config = config_with(max + 1, 0x40_0000, lines, BootStage::Bl31);
        assert!(matches!(
            derive_layout(&config),
            Err(LayoutError::MailboxOverflow(_))
        ));
    }
}

#[test]
fn every_overlap_is_reported() {
    let config = LayoutConfig::lcb(BootStage::Bl2).unwrap();
    let mut plan = derive_layout(&config).unwrap();
    let granule = |id, base: u64, size: u64| {
        Region::new(id, PhysicalAddress::new(base), ByteCount::new(size), 0x1000, 32).unwrap()
    };

    // three independent collisions
    plan.replace(granule(RegionId::Bl2, 0x11_0000, 0xC_0000));
    plan.replace(granule(RegionId::TranslationTables, 0x3F_0000, 0x3000));
    plan.replace(granule(RegionId::DescriptorArea, 0x7F_0000, 0x2_0000));

    let err = validate(plan, &config).unwrap_err();
    assert_eq!(
        err.violations(),
        [
            Violation::Overlap {
                first: RegionId::Bl1Ram,
                second: RegionId::Bl2
            },
            Violation::Overlap {
                first: RegionId::Bl31,
                second: RegionId::TranslationTables
            },
            Violation::Overlap {
                first: RegionId::Bl32,
                second: RegionId::DescriptorArea
            },
        ]
    );
}

#[test]
fn tables_in_bl2_reserved_tail_are_rejected() {
    let mut config = LayoutConfig::lcb(BootStage::Bl2).unwrap();
    config.budgets.set_xlat_offset(ByteCount::new(0x26_0000));

    let Err(LayoutError::LayoutViolation(err)) = build_layout(&config) else {
        panic!("tables inside the reserved tail accepted");
    };
    assert!(matches!(
        err.violations(),
        [Violation::ReservedTailOverlap {
            region: RegionId::TranslationTables,
            ..
        }]
    ));
}

#[test]
fn io_areas_above_ns_image_are_rejected() {
    let mut config = LayoutConfig::lcb(BootStage::Bl1).unwrap();
    config.budgets.set_descriptor_offset(ByteCount::new(0x400_0000));

    let Err(LayoutError::LayoutViolation(err)) = build_layout(&config) else {
        panic!("I/O areas above the non-secure image accepted");
    };
    let regions: Vec<RegionId> = err
        .violations()
        .iter()
        .filter_map(|v| match v {
            Violation::IoAreaAboveNsImage { region, .. } => Some(*region),
            _ => None,
        })
        .collect();
    assert_eq!(regions, [RegionId::DescriptorArea, RegionId::DataArea]);
}

#[test]
fn derivation_is_deterministic() {
    for stage in BootStage::ALL {
        let config = LayoutConfig::lcb(stage).unwrap();
        assert_eq!(derive_layout(&config), derive_layout(&config));
        assert_eq!(build_layout(&config), build_layout(&config));
    }
}

#[test]
fn lcb_board() {
    let config = LayoutConfig::lcb(BootStage::Bl1).unwrap();
    assert_eq!(config.topology.core_count(), 6);
    assert_eq!(config.topology.cluster_count(), 2);
    assert_eq!(config.topology.cache_line_size(), 64);

    let layout = build_layout(&config).unwrap();
    let base = |id| layout.region(id).unwrap().base();
    let limit = |id| layout.region(id).unwrap().limit();

    assert!(limit(RegionId::Bl1Ram) <= base(RegionId::Bl2));
    assert!(limit(RegionId::Bl2) <= base(RegionId::Bl31));
    assert_eq!(limit(RegionId::Bl31), base(RegionId::Bl32));
    assert_eq!(base(RegionId::Bl32).as_u64(), lcb::DRAM_SEC_BASE);

    let window = layout.plan().mailbox_window().base().as_u64();
    let offsets: Vec<u64> = layout
        .mailboxes()
        .slots()
        .iter()
        .map(|s| s.address().as_u64() - window)
        .collect();
    assert_eq!(offsets, [0, 64, 128, 192, 256, 320]);

    assert_eq!(layout.hand_off_address(BootStage::Bl2), base(RegionId::Bl2));
    assert_eq!(layout.ns_entry_point().as_u64(), 0x200_0000);
}

#[test]
fn limit_past_address_width_overflows() {
    let mut config = LayoutConfig::lcb(BootStage::Bl2).unwrap();
    config.budgets.set_ns_image_offset(ByteCount::new(0xFF00_0000));

    // ends exactly at 4 GiB: derivable, but outside DRAM
    let plan = derive_layout(&config).unwrap();
    assert_eq!(plan.get(RegionId::Bl33).unwrap().limit().as_u64(), 1 << 32);
    let err = validate(plan, &config).unwrap_err();
    assert!(matches!(
        err.violations(),
        [Violation::OutOfEnvelope {
            region: RegionId::Bl33,
            ..
        }]
    ));

    config.budgets.set_bl33_size(ByteCount::new(0x100_1000));
    assert_eq!(
        derive_layout(&config),
        Err(LayoutError::DerivationOverflow(DerivationOverflow {
            region: RegionId::Bl33,
            operation: "BL33 size",
            bits: 32,
        }))
    );
}

#[test]
fn board_header_offsets_collide() {
    // runtime, descriptors and payload at the board header's absolute offsets
    let mut config = LayoutConfig::lcb(BootStage::Bl2).unwrap();
    config
        .budgets
        .set_bl31_offset(ByteCount::new(0x4_0000))
        .set_descriptor_offset(ByteCount::new(0x8_0000))
        .set_ns_image_offset(ByteCount::new(0x40_0000));

    let Err(LayoutError::LayoutViolation(err)) = build_layout(&config) else {
        panic!("overlapping layout accepted");
    };
    assert_eq!(err.stage, BootStage::Bl2);
    for expected in [
        Violation::Overlap {
            first: RegionId::Bl1Ram,
            second: RegionId::Bl31,
        },
        Violation::Overlap {
            first: RegionId::Bl32,
            second: RegionId::DataArea,
        },
        Violation::Overlap {
            first: RegionId::Bl32,
            second: RegionId::Bl33,
        },
    ] {
        assert!(err.violations().contains(&expected), "{expected} not reported");
    }
}

#[test]
fn hand_built_plan_without_mailboxes() {
    let config = LayoutConfig::lcb(BootStage::Bl32).unwrap();
    let derived = derive_layout(&config).unwrap();
    let regions: Vec<Region> = derived
        .iter()
        .copied()
        .filter(|r| !matches!(r.id(), RegionId::Mailbox(_)))
        .collect();

    let err = validate(
        LayoutPlan::from_regions(regions, derived.mailbox_window()),
        &config,
    )
    .unwrap_err();
    let missing: Vec<RegionId> = err
        .violations()
        .iter()
        .filter_map(|v| match v {
            Violation::MissingRegion(id) => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(missing, (0..6).map(RegionId::Mailbox).collect::<Vec<_>>());
}
