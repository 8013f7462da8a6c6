use firmware_handoff::{HandoffError, HandoffTable, HandoffTarget, RegionTriple};
use firmware_layout::{LayoutConfig, RegionId, ValidatedLayout, build_layout};
use firmware_platform::BootStage;

fn layout(stage: BootStage) -> ValidatedLayout {
    build_layout(&LayoutConfig::lcb(stage).unwrap()).unwrap()
}

#[test]
fn secure_chain_enters_each_next_stage_at_its_load_address() {
    for stage in [BootStage::Bl1, BootStage::Bl2, BootStage::Bl31] {
        let layout = layout(stage);
        let table = HandoffTable::for_stage(&layout, stage).unwrap();
        let next = stage.next().unwrap();

        assert!(table.is_valid());
        assert_eq!(table.source(), Some(stage));
        assert_eq!(table.target(), Some(HandoffTarget::Stage(next)));
        assert_eq!(table.entry_point(), layout.hand_off_address(next));
        assert_eq!(
            table.image,
            RegionTriple::from_region(layout.stage_region(next))
        );
        assert_eq!(table.image.limit, table.image.base + table.image.size);
    }
}

#[test]
fn last_secure_stage_has_no_successor() {
    let layout = layout(BootStage::Bl32);
    assert_eq!(
        HandoffTable::for_stage(&layout, BootStage::Bl32),
        Err(HandoffError::NoSuccessor(BootStage::Bl32))
    );
}

#[test]
fn runtime_enters_non_secure_payload() {
    let layout = layout(BootStage::Bl31);
    let table = HandoffTable::non_secure(&layout, BootStage::Bl31).unwrap();
    assert_eq!(table.target(), Some(HandoffTarget::NonSecure));
    assert_eq!(table.entry_point(), layout.ns_entry_point());
    assert_eq!(table.image.base, 0x200_0000);

    assert_eq!(
        HandoffTable::non_secure(&self::layout(BootStage::Bl2), BootStage::Bl2),
        Err(HandoffError::NotRuntime(BootStage::Bl2))
    );
}

#[test]
fn table_needs_layout_of_handing_off_stage() {
    // BL31's layout sizes a two-table pool; BL1 needs three
    let runtime = layout(BootStage::Bl31);
    assert_eq!(
        HandoffTable::for_stage(&runtime, BootStage::Bl1),
        Err(HandoffError::StageMismatch {
            layout: BootStage::Bl31,
            stage: BootStage::Bl1
        })
    );
    assert_eq!(
        HandoffTable::non_secure(&layout(BootStage::Bl32), BootStage::Bl31),
        Err(HandoffError::StageMismatch {
            layout: BootStage::Bl32,
            stage: BootStage::Bl31
        })
    );
}

#[test]
fn shared_memory_matches_layout() {
    let layout = layout(BootStage::Bl2);
    let table = HandoffTable::for_stage(&layout, BootStage::Bl2).unwrap();

    let triple = |id| RegionTriple::from_region(layout.region(id).unwrap());
    assert_eq!(table.translation_tables, triple(RegionId::TranslationTables));
    assert_eq!(table.descriptors, triple(RegionId::DescriptorArea));
    assert_eq!(table.data, triple(RegionId::DataArea));
    assert_eq!(table.descriptors.limit, table.data.base);

    assert_eq!(table.core_count, 6);
    assert_eq!(table.mailbox_stride, 64);
    for core in 0..6 {
        assert_eq!(table.mailbox(core), layout.mailboxes().address(core));
    }
    assert_eq!(table.mailbox(6), None);
    assert_eq!(table.mailbox_window.range(), layout.mailboxes().window());
}
