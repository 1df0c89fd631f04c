//! Host capabilities the loader drives.
//!
//! The loader decides which regions, bytes, annotations and entry address
//! should exist; the host owns how they are stored and rendered. Every
//! capability is an explicit call on a `LoaderHost` value, with no global
//! analysis state.

pub mod memory;

use crate::error::LoaderError;
use crate::layout::{AddressRegion, RegionKind};
use bitflags::bitflags;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryImage;

bitflags! {
    /// Options for file bytes bound into a region.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct BindFlags: u32 {
        /// The host may rewrite bound bytes in place (relocation fix-ups)
        const PATCHABLE = 0b0000_0001;
    }
}

/// File bytes to place at the start of a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBinding {
    pub region: RegionKind,
    /// Absolute address of the first bound byte
    pub address: u64,
    pub file_offset: u64,
    pub data: Bytes,
    pub flags: BindFlags,
}

impl FileBinding {
    /// One past the last bound address.
    pub fn end(&self) -> u64 {
        self.address + self.data.len() as u64
    }
}

/// Failure reported by a host capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("processor model '{0}' is not supported")]
    UnsupportedProcessor(String),

    #[error("region [{start:#x}, {end:#x}) is empty or inverted")]
    InvalidRange { start: u64, end: u64 },

    #[error("region [{start:#x}, {end:#x}) overlaps existing {existing} region")]
    Overlap {
        start: u64,
        end: u64,
        existing: RegionKind,
    },

    #[error("{0} region does not exist")]
    MissingRegion(RegionKind),

    #[error("address {address:#x} is not mapped")]
    Unmapped { address: u64 },

    #[error("address {address:#x} is not patchable")]
    NotPatchable { address: u64 },

    #[error("{0}")]
    Other(String),
}

/// Capability interface consumed by the loader.
///
/// Methods are called in load order: processor model, regions and bindings,
/// entry address, then header annotations.
pub trait LoaderHost {
    /// Select the processor module. Refusal aborts the load.
    fn set_processor_model(&mut self, model: &str) -> Result<(), HostError>;

    /// Create an empty region.
    fn create_region(&mut self, region: &AddressRegion) -> Result<(), HostError>;

    /// Place file bytes into a previously created region.
    fn bind_file_bytes(&mut self, binding: FileBinding) -> Result<(), HostError>;

    /// Record the initial execution address and mark it as code.
    fn set_entry_address(&mut self, address: u64) -> Result<(), HostError>;

    /// Render `len` bytes at `address` as raw data.
    fn annotate_bytes(&mut self, address: u64, len: u32) -> Result<(), HostError>;

    /// Render `len` bytes at `address` as an ASCII string.
    fn annotate_ascii_string(&mut self, address: u64, len: u32) -> Result<(), HostError>;

    /// Called once when a load aborts, so the host can discard anything the
    /// load already created.
    fn abort_load(&mut self, _reason: &LoaderError) {}
}
