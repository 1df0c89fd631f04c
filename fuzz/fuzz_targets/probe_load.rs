#![no_main]
use gba_loader::config::LoadConfig;
use gba_loader::host::MemoryImage;
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let mut cursor = Cursor::new(data);
    let verdict = gba_loader::probe(&mut cursor, 0);
    assert_eq!(cursor.position(), 0);
    assert!(verdict.score_value() >= 0);

    let mut image = MemoryImage::new();
    match gba_loader::load::load_bytes(data, &mut image, &LoadConfig::default()) {
        Ok(result) => assert_eq!(image.entry(), Some(result.entry_address)),
        Err(_) => assert!(image.is_empty()),
    }
});
