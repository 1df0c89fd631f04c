//! Initial execution address from the header's entry branch.

use crate::branch::entry_branch_target;
use crate::header::RawHeader;
use crate::layout::ROM_START;
use serde::{Deserialize, Serialize};

/// Where the entry address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum EntrySource {
    /// Followed the entry branch to this file offset
    HeaderBranch { target: u32 },
    /// No usable branch; start of the ROM region
    RomBase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub address: u64,
    pub source: EntrySource,
}

/// Picks the entry address for a loaded image.
pub struct EntryPointResolver;

impl EntryPointResolver {
    /// Resolve against the usable (possibly truncated) ROM length.
    ///
    /// The branch is decoded in file-relative terms at offset 0; only a target
    /// strictly inside the bound ROM bytes is followed.
    pub fn resolve(header: &RawHeader, rom_len: u64) -> EntryPoint {
        match entry_branch_target(header.entry_word()) {
            Some(target) if u64::from(target) < rom_len => EntryPoint {
                address: ROM_START + u64::from(target),
                source: EntrySource::HeaderBranch { target },
            },
            _ => EntryPoint {
                address: ROM_START,
                source: EntrySource::RomBase,
            },
        }
    }
}
