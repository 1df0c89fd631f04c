//! Fixed memory map and the address-space builder.
//!
//! The target exposes three disjoint regions: external work RAM, internal
//! work RAM and the cartridge ROM window. They are created once per load in
//! that order, never resized and never removed.

use crate::error::{LoaderError, Result};
use crate::host::{BindFlags, FileBinding, LoaderHost};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Seek, SeekFrom};
use tracing::{debug, info};

pub const EWRAM_START: u64 = 0x0200_0000;
pub const EWRAM_END: u64 = 0x0204_0000;
pub const IWRAM_START: u64 = 0x0300_0000;
pub const IWRAM_END: u64 = 0x0300_8000;
pub const ROM_START: u64 = 0x0800_0000;
pub const ROM_END: u64 = 0x0A00_0000;

/// Largest image the ROM window can hold; longer files are truncated.
pub const MAX_ROM_SIZE: u64 = ROM_END - ROM_START;

/// The three regions of the memory map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegionKind {
    /// External work RAM
    Ewram,
    /// Internal fast work RAM
    Iwram,
    /// Cartridge code and data
    Rom,
}

impl RegionKind {
    /// Creation order.
    pub const ALL: [RegionKind; 3] = [RegionKind::Ewram, RegionKind::Iwram, RegionKind::Rom];

    pub fn name(self) -> &'static str {
        match self {
            RegionKind::Ewram => "EWRAM",
            RegionKind::Iwram => "IWRAM",
            RegionKind::Rom => "ROM",
        }
    }

    pub fn start(self) -> u64 {
        match self {
            RegionKind::Ewram => EWRAM_START,
            RegionKind::Iwram => IWRAM_START,
            RegionKind::Rom => ROM_START,
        }
    }

    pub fn end(self) -> u64 {
        match self {
            RegionKind::Ewram => EWRAM_END,
            RegionKind::Iwram => IWRAM_END,
            RegionKind::Rom => ROM_END,
        }
    }

    /// ROM holds code; the RAM regions are uninitialized data.
    pub fn is_code(self) -> bool {
        self == RegionKind::Rom
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// File bytes bound at the start of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBacking {
    pub file_offset: u64,
    pub len: u64,
    pub flags: BindFlags,
}

/// A half-open `[start, end)` region of the simulated address space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRegion {
    pub kind: RegionKind,
    pub start: u64,
    pub end: u64,
    /// `None` for uninitialized memory
    pub backing: Option<FileBacking>,
}

impl AddressRegion {
    fn unbacked(kind: RegionKind) -> Self {
        Self {
            kind,
            start: kind.start(),
            end: kind.end(),
            backing: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    pub fn contains(&self, address: u64) -> bool {
        address >= self.start && address < self.end
    }

    pub fn overlaps(&self, other: &AddressRegion) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for AddressRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{:#010x}, {:#010x})", self.name(), self.start, self.end)?;
        if let Some(b) = &self.backing {
            write!(f, " <- file[{:#x}, {:#x})", b.file_offset, b.file_offset + b.len)?;
        }
        Ok(())
    }
}

/// The regions produced by a successful build, in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSpace {
    regions: Vec<AddressRegion>,
}

impl AddressSpace {
    pub fn regions(&self) -> &[AddressRegion] {
        &self.regions
    }

    pub fn region(&self, kind: RegionKind) -> Option<&AddressRegion> {
        self.regions.iter().find(|r| r.kind == kind)
    }

    /// Number of file bytes bound into the ROM region.
    pub fn rom_len(&self) -> u64 {
        self.region(RegionKind::Rom)
            .and_then(|r| r.backing)
            .map_or(0, |b| b.len)
    }

    pub fn into_regions(self) -> Vec<AddressRegion> {
        self.regions
    }
}

/// Plans and creates the fixed memory map for one source.
#[derive(Debug, Clone, Copy)]
pub struct AddressSpaceBuilder {
    rom_len: u64,
}

impl AddressSpaceBuilder {
    /// Builder for a source of `source_len` bytes, capped at `MAX_ROM_SIZE`.
    pub fn new(source_len: u64) -> Self {
        Self {
            rom_len: source_len.min(MAX_ROM_SIZE),
        }
    }

    /// Usable ROM length after truncation.
    pub fn rom_len(&self) -> u64 {
        self.rom_len
    }

    /// Regions this builder will create, in creation order.
    pub fn plan(&self) -> [AddressRegion; 3] {
        let mut rom = AddressRegion::unbacked(RegionKind::Rom);
        rom.backing = Some(FileBacking {
            file_offset: 0,
            len: self.rom_len,
            flags: BindFlags::PATCHABLE,
        });
        [
            AddressRegion::unbacked(RegionKind::Ewram),
            AddressRegion::unbacked(RegionKind::Iwram),
            rom,
        ]
    }

    /// Create every region on `host` and bind the ROM bytes from `source`.
    ///
    /// Stops at the first failure; the caller is responsible for aborting the
    /// load so the host can discard what was already created.
    ///
    /// # Errors
    /// `LoaderError::RegionCreation` naming the failed region, or an I/O
    /// error while reading the ROM bytes.
    pub fn build<S, H>(&self, source: &mut S, host: &mut H) -> Result<AddressSpace>
    where
        S: Read + Seek + ?Sized,
        H: LoaderHost + ?Sized,
    {
        let mut regions = Vec::with_capacity(3);
        for region in self.plan() {
            host.create_region(&region)
                .map_err(|e| LoaderError::RegionCreation {
                    region: region.kind,
                    reason: e.to_string(),
                })?;
            debug!(region = %region, "Created region");

            if let Some(backing) = region.backing {
                let data = read_backing(source, &backing)?;
                let binding = FileBinding {
                    region: region.kind,
                    address: region.start,
                    file_offset: backing.file_offset,
                    data,
                    flags: backing.flags,
                };
                host.bind_file_bytes(binding)
                    .map_err(|e| LoaderError::RegionCreation {
                        region: region.kind,
                        reason: format!(
                            "failed mapping {:#x} -> [{:#x}, {:#x}): {}",
                            backing.file_offset,
                            region.start,
                            region.start + backing.len,
                            e
                        ),
                    })?;
            }
            regions.push(region);
        }

        info!(rom_len = self.rom_len, "Address space built");
        Ok(AddressSpace { regions })
    }
}

fn read_backing<S: Read + Seek + ?Sized>(source: &mut S, backing: &FileBacking) -> Result<Bytes> {
    source.seek(SeekFrom::Start(backing.file_offset))?;
    let mut data = Vec::with_capacity(backing.len as usize);
    Read::take(&mut *source, backing.len).read_to_end(&mut data)?;
    if (data.len() as u64) < backing.len {
        return Err(LoaderError::ShortRead {
            needed: backing.len,
            found: data.len() as u64,
        });
    }
    Ok(Bytes::from(data))
}
