use crate::common::HeaderBuilder;
use gba_loader::config::LoadConfig;
use gba_loader::error::LoaderError;
use gba_loader::host::{BindFlags, MemoryImage};
use gba_loader::layout::{RegionKind, MAX_ROM_SIZE, ROM_START};
use gba_loader::load::annotations::{AnnotationKind, HeaderField, HEADER_ANNOTATIONS};
use gba_loader::load::{load, load_bytes, load_checked, EntrySource, LoadResult, PROCESSOR_MODEL};
use std::io::Cursor;

#[test]
fn scenario_a_entry_follows_branch() {
    let mut image = MemoryImage::new();
    let data = HeaderBuilder::new().build_image(0x400);
    let result = load_bytes(&data, &mut image, &LoadConfig::default()).unwrap();

    assert_eq!(result.processor_model, PROCESSOR_MODEL);
    assert_eq!(image.processor(), Some("arm"));
    assert_eq!(result.entry_address, 0x0800_00C0);
    assert_eq!(result.entry.source, EntrySource::HeaderBranch { target: 0xC0 });
    assert_eq!(image.entry(), Some(0x0800_00C0));
}

#[test]
fn bare_header_branch_target_is_not_inside_rom() {
    // 0xC0 equals the bound length of a header-only image.
    let mut image = MemoryImage::new();
    let result = load_bytes(&HeaderBuilder::new().build(), &mut image, &LoadConfig::default()).unwrap();
    assert_eq!(result.rom_len, 192);
    assert_eq!(result.entry_address, ROM_START);
    assert_eq!(result.entry.source, EntrySource::RomBase);
}

#[test]
fn scenario_c_one_mebibyte_image() {
    let data = HeaderBuilder::new().build_image(1_048_576);
    let mut image = MemoryImage::new();
    let result = load_checked(&mut Cursor::new(&data), &mut image, &LoadConfig::default()).unwrap();

    let kinds: Vec<_> = result.regions.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![RegionKind::Ewram, RegionKind::Iwram, RegionKind::Rom]);

    let ewram = image.region(RegionKind::Ewram).unwrap();
    assert_eq!((ewram.start, ewram.end), (0x0200_0000, 0x0204_0000));
    assert!(ewram.backing.is_none());

    let iwram = image.region(RegionKind::Iwram).unwrap();
    assert_eq!((iwram.start, iwram.end), (0x0300_0000, 0x0300_8000));
    assert!(iwram.backing.is_none());

    let rom = image.region(RegionKind::Rom).unwrap();
    assert_eq!((rom.start, rom.end), (0x0800_0000, 0x0A00_0000));
    let backing = rom.backing.unwrap();
    assert_eq!(backing.file_offset, 0);
    assert_eq!(backing.len, 0x10_0000);
    assert!(backing.flags.contains(BindFlags::PATCHABLE));

    assert_eq!(result.rom_len, 0x10_0000);
    assert_eq!(image.read(ROM_START, 192).unwrap(), &data[..192]);
    assert_eq!(image.read_u8(ROM_START + 0xF_FFFF), Some(data[0xF_FFFF]));
    assert_eq!(image.read_u8(ROM_START + 0x10_0000), None);
    assert_eq!(image.read_u32_le(ROM_START), Some(0xEA00_002E));
}

#[test]
fn header_fields_are_annotated_in_rom() {
    let mut image = MemoryImage::new();
    let result = load_bytes(&HeaderBuilder::new().build(), &mut image, &LoadConfig::default()).unwrap();

    assert_eq!(result.annotations, HEADER_ANNOTATIONS.to_vec());
    let recorded = image.annotations();
    assert_eq!(recorded.len(), 9);

    let logo = HEADER_ANNOTATIONS
        .iter()
        .find(|a| a.field == HeaderField::Logo)
        .unwrap();
    assert_eq!((logo.address(), logo.len), (ROM_START + 4, 156));

    let ascii: Vec<_> = recorded
        .iter()
        .filter(|a| a.kind == AnnotationKind::Ascii)
        .map(|a| (a.address - ROM_START, a.len))
        .collect();
    assert_eq!(ascii, vec![(0xA0, 12), (0xAC, 4), (0xB0, 2)]);

    let singles: Vec<_> = recorded
        .iter()
        .filter(|a| a.kind == AnnotationKind::Bytes && a.len == 1)
        .map(|a| a.address - ROM_START)
        .collect();
    assert_eq!(singles, vec![0xB2, 0xB3, 0xB4, 0xBC, 0xBD]);
}

#[test]
fn load_restarts_from_offset_zero() {
    let data = HeaderBuilder::new().build_image(512);
    let mut cursor = Cursor::new(&data);
    cursor.set_position(300);
    let mut image = MemoryImage::new();
    let result = load(&mut cursor, &mut image, &LoadConfig::default()).unwrap();
    assert_eq!(result.rom_len, 512);
    assert_eq!(image.read(ROM_START, 512).unwrap(), &data[..]);
}

#[test]
fn branch_beyond_rom_falls_back_to_base() {
    // Target 0x10000 on a 4 KiB image.
    let data = HeaderBuilder::new().entry_word(0xEA00_3FFE).build_image(4096);
    let mut image = MemoryImage::new();
    let result = load_bytes(&data, &mut image, &LoadConfig::default()).unwrap();
    assert_eq!(result.entry_address, ROM_START);
    assert_eq!(result.entry.source, EntrySource::RomBase);
}

#[test]
fn load_checked_refuses_before_touching_host() {
    let mut image = MemoryImage::new();
    let err = load_checked(
        &mut Cursor::new(vec![0u8; 192]),
        &mut image,
        &LoadConfig::default(),
    )
    .unwrap_err();
    assert!(err.is_mismatch());
    assert!(image.is_empty());
}

#[test]
fn loaded_rom_is_patchable() {
    let mut image = MemoryImage::new();
    load_bytes(&HeaderBuilder::new().build_image(256), &mut image, &LoadConfig::default()).unwrap();
    image.patch(ROM_START + 0xC0, &[0xDE, 0xAD]).unwrap();
    assert_eq!(image.read(ROM_START + 0xC0, 2).unwrap(), &[0xDE, 0xAD]);
    assert!(image.patch(0x0200_0000, &[0]).is_err());
}

#[test]
fn result_round_trips_through_json() {
    let mut image = MemoryImage::new();
    let result = load_bytes(&HeaderBuilder::new().build_image(300), &mut image, &LoadConfig::default()).unwrap();
    let json = result.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["processor_model"], "arm");
    assert_eq!(value["entry_address"], 0x0800_00C0u64);
    assert_eq!(LoadResult::from_json(&json).unwrap(), result);
}

#[test]
fn truncation_cap_is_32_mib() {
    assert_eq!(MAX_ROM_SIZE, 0x0200_0000);
    let mut image = MemoryImage::new();
    let err = load_bytes(&[0u8; 10], &mut image, &LoadConfig::default()).unwrap_err();
    assert!(matches!(err.root(), LoaderError::ShortRead { .. }));
}
