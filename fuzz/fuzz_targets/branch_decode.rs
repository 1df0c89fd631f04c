#![no_main]
use gba_loader::branch::{branch_target, entry_branch_target};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u32, u32)| {
    let (addr, word) = input;
    let _ = branch_target(addr, word);
    if let Some(t) = entry_branch_target(word) {
        assert_eq!(branch_target(0, word), Some(t));
    }
});
