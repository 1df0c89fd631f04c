use crate::common::test_utils::{create_temp_file, create_temp_file_with_size};
use crate::common::HeaderBuilder;
use gba_loader::config::{IOConfig, LoaderConfig};
use gba_loader::error::LoaderError;
use gba_loader::host::MemoryImage;
use gba_loader::io::error::IoError;
use gba_loader::layout::{RegionKind, ROM_START};
use gba_loader::load::load_path;
use gba_loader::probe::{probe_path, probe_paths, Mismatch};

#[test]
fn scenario_c_from_disk() {
    let data = HeaderBuilder::new().build_image(1_048_576);
    let file = create_temp_file(&data);

    let config = LoaderConfig::default();
    assert!(probe_path(file.path(), &config.io).matched);

    let mut image = MemoryImage::new();
    let result = load_path(file.path(), &mut image, &config).unwrap();
    assert_eq!(result.source_len, 1_048_576);
    assert_eq!(result.rom_len, 0x10_0000);
    assert_eq!(result.entry_address, 0x0800_00C0);

    let rom = image.region(RegionKind::Rom).unwrap();
    assert_eq!((rom.start, rom.end), (0x0800_0000, 0x0A00_0000));
    assert_eq!(image.read(ROM_START + 0x8_0000, 64).unwrap(), &data[0x8_0000..0x8_0040]);
}

#[test]
fn oversized_file_is_a_mismatch_for_detection() {
    let file = create_temp_file_with_size(4096, 0);
    let config = LoaderConfig {
        io: IOConfig {
            max_file_size: 1024,
            ..Default::default()
        },
        ..Default::default()
    };
    let verdict = probe_path(file.path(), &config.io);
    assert!(!verdict.matched);
    assert!(matches!(verdict.mismatch, Some(Mismatch::Unreadable { .. })));

    // Loading the same file is still a hard error.
    let mut image = MemoryImage::new();
    let err = load_path(file.path(), &mut image, &config).unwrap_err();
    assert!(matches!(err, LoaderError::SafeIo(IoError::FileTooLarge { found: 4096, .. })));
}

#[test]
fn read_budget_exhaustion_aborts_load() {
    let file = create_temp_file(&HeaderBuilder::new().build_image(64 * 1024));
    let mut config = LoaderConfig::default();
    config.io.max_read_bytes = 8 * 1024;

    // The header alone fits in the budget.
    assert!(probe_path(file.path(), &config.io).matched);

    let mut image = MemoryImage::new();
    let err = load_path(file.path(), &mut image, &config).unwrap_err();
    assert!(matches!(err.root(), LoaderError::Io(_)));
    assert!(image.is_empty());
}

#[test]
fn empty_file_is_a_short_read_mismatch() {
    let file = create_temp_file(b"");
    let verdict = probe_path(file.path(), &IOConfig::default());
    assert_eq!(verdict.mismatch, Some(Mismatch::ShortRead { found: 0 }));
}

#[test]
fn missing_file_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let verdict = probe_path(dir.path().join("absent.gba"), &IOConfig::default());
    assert!(!verdict.matched);
    match verdict.mismatch {
        Some(Mismatch::Unreadable { reason }) => assert!(!reason.is_empty()),
        other => panic!("unexpected mismatch: {other:?}"),
    }
}

#[test]
fn detect_many_files_in_parallel() {
    let good = create_temp_file(&HeaderBuilder::new().build_image(1024));
    let zeros = create_temp_file_with_size(1024, 0);
    let short = create_temp_file(&[0xEA; 10]);
    let paths = vec![
        good.path().to_path_buf(),
        zeros.path().to_path_buf(),
        short.path().to_path_buf(),
    ];

    let results = probe_paths(&paths, &IOConfig::default());
    assert_eq!(results.len(), 3);
    for ((path, _), expected) in results.iter().zip(&paths) {
        assert_eq!(path, expected);
    }
    let matched: Vec<bool> = results.iter().map(|(_, v)| v.matched).collect();
    assert_eq!(matched, vec![true, false, false]);
}
