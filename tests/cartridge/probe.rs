use crate::common::{HeaderBuilder, BRANCH_TO_0XC0};
use gba_loader::header::NINTENDO_LOGO;
use gba_loader::probe::{probe, probe_bytes, Mismatch, ScoreSignal, MATCH_THRESHOLD};
use gba_loader::FORMAT_LABEL;
use std::io::{Cursor, Seek, SeekFrom};

#[test]
fn scenario_a_synthetic_header_matches() {
    let verdict = probe_bytes(&HeaderBuilder::new().build());
    assert!(verdict.matched);
    assert_eq!(verdict.format_label(), Some("Gameboy Advance ROM"));
    assert_eq!(verdict.format_label(), Some(FORMAT_LABEL));
    assert_eq!(verdict.score_value(), 14);
    assert!(verdict.mismatch.is_none());

    let score = verdict.score.unwrap();
    for signal in [
        ScoreSignal::BranchOpcode,
        ScoreSignal::BranchPastHeader,
        ScoreSignal::Logo,
        ScoreSignal::Checksum,
        ScoreSignal::Title,
        ScoreSignal::GameCode,
        ScoreSignal::MakerCode,
        ScoreSignal::FixedByte,
    ] {
        assert!(score.has(signal), "missing {}", signal);
    }
}

#[test]
fn scenario_b_zero_buffer_rejected() {
    let verdict = probe_bytes(&[0u8; 192]);
    assert!(!verdict.matched);
    assert_eq!(verdict.format_label(), None);
    let score = verdict.score.as_ref().unwrap();
    assert!(score.has(ScoreSignal::NotABranch));
    assert!(!score.has(ScoreSignal::Checksum));
    assert!(!score.has(ScoreSignal::Logo));
    assert!(score.value() < MATCH_THRESHOLD);
}

#[test]
fn nonzero_candidate_index_never_matches() {
    let header = HeaderBuilder::new().build();
    for index in [1u32, 2, u32::MAX] {
        let verdict = probe(&mut Cursor::new(&header[..]), index);
        assert!(!verdict.matched);
        assert_eq!(verdict.mismatch, Some(Mismatch::UnsupportedVariant { index }));
    }
}

#[test]
fn detection_preserves_cursor_position() {
    let image = HeaderBuilder::new().build_image(4096);
    let mut cursor = Cursor::new(image);
    cursor.seek(SeekFrom::Start(1234)).unwrap();
    assert!(probe(&mut cursor, 0).matched);
    assert_eq!(cursor.position(), 1234);

    // Also on a rejected source.
    let mut short = Cursor::new(vec![0u8; 100]);
    short.seek(SeekFrom::Start(42)).unwrap();
    assert!(!probe(&mut short, 0).matched);
    assert_eq!(short.position(), 42);
}

#[test]
fn short_source_is_rejected_without_error() {
    let header = HeaderBuilder::new().build();
    let verdict = probe_bytes(&header[..191]);
    assert!(!verdict.matched);
    assert_eq!(verdict.mismatch, Some(Mismatch::ShortRead { found: 191 }));
    assert!(verdict.score.is_none());
}

#[test]
fn branch_outside_file_is_penalized() {
    // Offset 0x3FFE -> target 0x10000, beyond a 192-byte source.
    let header = HeaderBuilder::new().entry_word(0xEA00_3FFE).build();
    let verdict = probe_bytes(&header);
    let score = verdict.score.unwrap();
    assert!(score.has(ScoreSignal::BranchOpcode));
    assert!(score.has(ScoreSignal::BranchOutsideFile));
    assert!(!score.has(ScoreSignal::BranchPastHeader));
    assert_eq!(score.value(), 2 - 2 + 2 + 4 + 4);
}

#[test]
fn branch_inside_long_file_is_neutral() {
    let image = HeaderBuilder::new().entry_word(0xEA00_3FFE).build_image(0x20000);
    let score = probe_bytes(&image).score.unwrap();
    assert!(!score.has(ScoreSignal::BranchOutsideFile));
    assert!(!score.has(ScoreSignal::BranchPastHeader));
    assert_eq!(score.value(), 12);
}

#[test]
fn branch_target_at_source_length_is_outside() {
    // Offset 0x3E -> target 0x100.
    let header = HeaderBuilder::new().entry_word(0xEA00_003E);

    let at_end = probe_bytes(&header.clone().build_image(0x100)).score.unwrap();
    assert!(at_end.has(ScoreSignal::BranchOutsideFile));
    assert_eq!(at_end.value(), 10);

    let inside = probe_bytes(&header.build_image(0x101)).score.unwrap();
    assert!(!inside.has(ScoreSignal::BranchOutsideFile));
    assert_eq!(inside.value(), 12);
}

#[test]
fn fixed_byte_alone_costs_one_point() {
    let header = HeaderBuilder::new().fixed_byte(0x97).build();
    let score = probe_bytes(&header).score.unwrap();
    assert!(!score.has(ScoreSignal::FixedByte));
    assert!(score.has(ScoreSignal::Checksum));
    assert_eq!(score.value(), 13);
}

#[test]
fn wrong_stored_checksum_drops_checksum_signal() {
    let good = HeaderBuilder::new().build();
    let header = HeaderBuilder::new().checksum(good[0xBD].wrapping_add(1)).build();
    let score = probe_bytes(&header).score.unwrap();
    assert!(!score.has(ScoreSignal::Checksum));
    assert!(score.has(ScoreSignal::Logo));
    assert_eq!(score.value(), 10);
}

#[test]
fn conditional_branch_is_not_the_entry_opcode() {
    // BNE with the same offset.
    let header = HeaderBuilder::new()
        .entry_word((BRANCH_TO_0XC0 & 0x0FFF_FFFF) | 0x1000_0000)
        .build();
    let score = probe_bytes(&header).score.unwrap();
    assert!(score.has(ScoreSignal::NotABranch));
    assert!(!score.has(ScoreSignal::BranchPastHeader));
    assert_eq!(score.value(), 14 - 4 - 4);
}

#[test]
fn nul_padded_title_still_scores() {
    let header = HeaderBuilder::new().title(b"POKEMON").build();
    let score = probe_bytes(&header).score.unwrap();
    assert!(score.has(ScoreSignal::Title));
}

#[test]
fn nul_in_fixed_length_codes_is_rejected() {
    let header = HeaderBuilder::new()
        .game_code(b"AB\0D")
        .maker_code(b"0\0")
        .build();
    let score = probe_bytes(&header).score.unwrap();
    assert!(!score.has(ScoreSignal::GameCode));
    assert!(!score.has(ScoreSignal::MakerCode));
    assert_eq!(score.value(), 12);
}

#[test]
fn lowercase_title_loses_one_point() {
    let header = HeaderBuilder::new().title(b"game title").build();
    let score = probe_bytes(&header).score.unwrap();
    assert!(!score.has(ScoreSignal::Title));
    assert_eq!(score.value(), 13);
}

#[test]
fn single_logo_byte_drops_logo_signal() {
    let header = HeaderBuilder::new().logo_byte(77, !NINTENDO_LOGO[77]).build();
    let score = probe_bytes(&header).score.unwrap();
    assert!(!score.has(ScoreSignal::Logo));
    assert!(score.has(ScoreSignal::Checksum));
    assert_eq!(score.value(), 12);
}

#[test]
fn verdict_serializes_with_signal_breakdown() {
    let verdict = probe_bytes(&[0u8; 192]);
    let json = serde_json::to_string(&verdict).unwrap();
    assert!(json.contains("\"below_threshold\""));
    assert!(json.contains("not_a_branch"));
}
