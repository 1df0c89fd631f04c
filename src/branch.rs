//! ARM `B` instruction decoding for the cartridge entry word.
//!
//! The match rule only pins two opcode bits and is kept as-is: the scorer and
//! the entry resolver both rely on exactly this behavior, so it must not be
//! tightened without checking real cartridge headers.

/// Bits that must be set for a word to decode as a branch.
pub const BRANCH_MATCH_MASK: u32 = 0x0A00_0000;

/// Mask and pattern for `B` with the always condition (`EA` top byte).
pub const BRANCH_ALWAYS_MASK: u32 = 0xFFC0_0000;
pub const BRANCH_ALWAYS_PATTERN: u32 = 0xEA00_0000;

/// ARM reads PC two instructions ahead of the executing one.
pub const PIPELINE_OFFSET: u32 = 8;

const OFFSET_MASK: u32 = 0x00FF_FFFF;
const OFFSET_SIGN: u32 = 0x0080_0000;

/// Decode `instruction` sitting at `current_address` as a branch.
///
/// Returns `None` when `(instruction & 0x0A000000) != 0x0A000000`. A target of
/// zero is a legitimate result and is distinct from `None`. Arithmetic wraps
/// at 32 bits, so backward branches near address 0 land at the top of the
/// address space.
pub fn branch_target(current_address: u32, instruction: u32) -> Option<u32> {
    if instruction & BRANCH_MATCH_MASK != BRANCH_MATCH_MASK {
        return None;
    }

    let mut offset = instruction & OFFSET_MASK;
    if offset & OFFSET_SIGN != 0 {
        offset |= !OFFSET_MASK;
    }

    Some(
        current_address
            .wrapping_add(PIPELINE_OFFSET)
            .wrapping_add(offset.wrapping_mul(4)),
    )
}

/// True for an unconditional `B` (never `BL`) with the always condition.
pub fn is_branch_always(instruction: u32) -> bool {
    instruction & BRANCH_ALWAYS_MASK == BRANCH_ALWAYS_PATTERN
}

/// Target of the header's entry branch, evaluated at file offset 0.
///
/// Requires the branch-always form first; both the scorer and the entry
/// resolver go through here so they always agree.
pub fn entry_branch_target(entry_word: u32) -> Option<u32> {
    if !is_branch_always(entry_word) {
        return None;
    }
    branch_target(0, entry_word)
}
