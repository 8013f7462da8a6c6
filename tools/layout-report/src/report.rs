use firmware_layout::{Region, RegionId, ValidatedLayout};
use firmware_platform::BootImage;
use firmware_platform::images::{LINKER_ARCH, LINKER_FORMAT};
use firmware_platform::lcb::{MAX_IO_DEVICES, MAX_IO_HANDLES, ONCHIPROM_PARAM_BASE, PLATFORM_STACK_SIZE};
use std::fmt::Write;

/// Prefix of the linker symbols describing a region.
const fn symbol_prefix(id: RegionId) -> Option<&'static str> {
    match id {
        RegionId::Bl1Rom => Some("BL1_RO"),
        RegionId::Bl1Ram => Some("BL1_RW"),
        RegionId::Bl2 => Some("BL2"),
        RegionId::Bl31 => Some("BL31"),
        RegionId::Bl32 => Some("BL32"),
        RegionId::Bl33 => Some("BL33"),
        RegionId::DescriptorArea => Some("IO_DESC"),
        RegionId::DataArea => Some("IO_DATA"),
        RegionId::TranslationTables => Some("XLAT_TABLES"),
        // described by the window symbols
        RegionId::Mailbox(_) => None,
    }
}

/// `(name, value)` pairs for the linker, in plan order.
pub fn linker_symbols(layout: &ValidatedLayout) -> Vec<(String, u64)> {
    let mut symbols = Vec::new();
    for region in layout.iter() {
        let Some(prefix) = symbol_prefix(region.id()) else {
            continue;
        };
        symbols.push((format!("{prefix}_BASE"), region.base().as_u64()));
        symbols.push((format!("{prefix}_LIMIT"), region.limit().as_u64()));
        symbols.push((format!("{prefix}_SIZE"), region.size().as_u64()));
    }

    let mailboxes = layout.mailboxes();
    let limits = layout.limits();
    symbols.extend([
        ("MAILBOX_BASE".to_owned(), mailboxes.window().base().as_u64()),
        ("MAILBOX_STRIDE".to_owned(), mailboxes.stride()),
        ("CACHE_WRITEBACK_GRANULE".to_owned(), layout.topology().cache_line_size()),
        ("PLATFORM_STACK_SIZE".to_owned(), PLATFORM_STACK_SIZE.as_u64()),
        ("PLATFORM_CORE_COUNT".to_owned(), u64::from(layout.topology().core_count())),
        ("MAX_XLAT_TABLES".to_owned(), u64::from(limits.max_xlat_tables)),
        ("MAX_MMAP_REGIONS".to_owned(), u64::from(limits.max_mmap_regions)),
        ("MAX_IO_DEVICES".to_owned(), u64::from(MAX_IO_DEVICES)),
        ("MAX_IO_HANDLES".to_owned(), u64::from(MAX_IO_HANDLES)),
        ("ONCHIPROM_PARAM_BASE".to_owned(), ONCHIPROM_PARAM_BASE),
    ]);
    symbols
}

/// `--defsym=NAME=0x…` per symbol.
pub fn defsym_args(layout: &ValidatedLayout) -> Vec<String> {
    linker_symbols(layout)
        .into_iter()
        .map(|(name, value)| format!("--defsym={name}={value:#x}"))
        .collect()
}

fn row(out: &mut String, name: &str, region: &Region) {
    let _ = writeln!(
        out,
        "{name:<16} {:<12} {:<12} {:<10} {:#x}",
        region.base().to_string(),
        region.limit().to_string(),
        region.size().to_string(),
        region.alignment()
    );
}

/// Human readable region table.
pub fn render_table(layout: &ValidatedLayout) -> String {
    let topology = layout.topology();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} layout: {} cores in {} clusters, {}-byte cache lines, {}-bit physical addresses",
        layout.stage(),
        topology.core_count(),
        topology.cluster_count(),
        topology.cache_line_size(),
        topology.address_space_bits()
    );
    let _ = writeln!(
        out,
        "{:<16} {:<12} {:<12} {:<10} align",
        "region", "base", "limit", "size"
    );

    let mut regions: Vec<&Region> = layout.iter().collect();
    regions.sort_by_key(|r| r.base());
    for region in regions {
        row(&mut out, &region.id().to_string(), region);
    }

    let mailboxes = layout.mailboxes();
    let window = mailboxes.window();
    let _ = writeln!(
        out,
        "mailbox window {window}, stride {:#x}, room for {} cores",
        mailboxes.stride(),
        firmware_layout::MailboxTable::max_cores(window, mailboxes.stride())
    );
    let _ = writeln!(out, "bl2 reserved tail {}", layout.reserved_tail());
    let _ = writeln!(
        out,
        "memory map entries: {} of {}; translation tables: {}",
        layout.mapping_count(),
        layout.limits().max_mmap_regions,
        layout.limits().max_xlat_tables
    );

    let images: Vec<&str> = BootImage::ALL.iter().map(|i| i.file_name()).collect();
    let _ = writeln!(out, "images: {}", images.join(" "));
    let _ = writeln!(out, "linker: {LINKER_FORMAT} ({LINKER_ARCH})");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use firmware_layout::{LayoutConfig, build_layout};
    use firmware_platform::BootStage;

    fn lcb(stage: BootStage) -> ValidatedLayout {
        build_layout(&LayoutConfig::lcb(stage).unwrap()).unwrap()
    }

    #[test]
    fn defsyms_follow_layout() {
        let args = defsym_args(&lcb(BootStage::Bl31));
        assert!(args.contains(&"--defsym=BL31_BASE=0x300000".to_owned()));
        assert!(args.contains(&"--defsym=BL31_LIMIT=0x400000".to_owned()));
        assert!(args.contains(&"--defsym=BL32_BASE=0x400000".to_owned()));
        assert!(args.contains(&"--defsym=MAILBOX_STRIDE=0x40".to_owned()));
        assert!(args.contains(&"--defsym=MAX_XLAT_TABLES=0x2".to_owned()));
        assert!(args.contains(&"--defsym=MAX_IO_DEVICES=0x3".to_owned()));
        assert!(args.contains(&"--defsym=MAX_IO_HANDLES=0x4".to_owned()));
        assert!(!args.iter().any(|a| a.contains("MAILBOX_0")));
    }

    #[test]
    fn every_fixed_region_gets_three_symbols() {
        let symbols = linker_symbols(&lcb(BootStage::Bl2));
        for id in RegionId::FIXED {
            let prefix = symbol_prefix(id).unwrap();
            let count = symbols
                .iter()
                .filter(|(name, _)| {
                    name.strip_prefix(prefix)
                        .is_some_and(|rest| ["_BASE", "_LIMIT", "_SIZE"].contains(&rest))
                })
                .count();
            assert_eq!(count, 3, "{prefix}");
        }
    }

    #[test]
    fn table_is_sorted_by_base() {
        let table = render_table(&lcb(BootStage::Bl1));
        let rom = table.find("bl1_rom").unwrap();
        let ram = table.find("bl1_mem").unwrap();
        let tables = table.find("xlat_tables").unwrap();
        let bl33 = table.find("bl33 ").unwrap();
        assert!(rom < ram && ram < tables && tables < bl33);
        assert!(table.contains("mailbox[5]"));
        assert!(table.contains("bl2 reserved tail [0x00258000..0x00298000)"));
        assert!(table.contains("images: bl1.bin bl2.bin bl30.bin bl31.bin bl32.bin bl33.bin fip.bin"));
    }
}
