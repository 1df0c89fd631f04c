//! In-memory host that records everything a load asks for.
//!
//! Useful as a reference implementation of `LoaderHost`, for tests, and for
//! callers that only want the resulting memory image.

use super::{BindFlags, FileBinding, HostError, LoaderHost};
use crate::error::LoaderError;
use crate::layout::{AddressRegion, RegionKind};
use crate::load::annotations::AnnotationKind;
use bytes::BytesMut;
use serde::Serialize;
use tracing::{debug, warn};

/// An annotation request as received by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordedAnnotation {
    pub address: u64,
    pub len: u32,
    pub kind: AnnotationKind,
}

#[derive(Debug, Clone)]
struct MappedBytes {
    address: u64,
    data: BytesMut,
    flags: BindFlags,
}

impl MappedBytes {
    fn end(&self) -> u64 {
        self.address + self.data.len() as u64
    }

    fn covers(&self, address: u64, len: u64) -> bool {
        address >= self.address && address.saturating_add(len) <= self.end()
    }
}

/// Simulated address space built from loader requests.
#[derive(Debug, Clone)]
pub struct MemoryImage {
    supported_processors: Vec<String>,
    processor: Option<String>,
    regions: Vec<AddressRegion>,
    mapped: Vec<MappedBytes>,
    entry: Option<u64>,
    annotations: Vec<RecordedAnnotation>,
}

impl Default for MemoryImage {
    fn default() -> Self {
        Self::with_processors(["arm"])
    }
}

impl MemoryImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that only accepts the given processor models.
    pub fn with_processors<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            supported_processors: models.into_iter().map(Into::into).collect(),
            processor: None,
            regions: Vec::new(),
            mapped: Vec::new(),
            entry: None,
            annotations: Vec::new(),
        }
    }

    pub fn processor(&self) -> Option<&str> {
        self.processor.as_deref()
    }

    pub fn regions(&self) -> &[AddressRegion] {
        &self.regions
    }

    pub fn region(&self, kind: RegionKind) -> Option<&AddressRegion> {
        self.regions.iter().find(|r| r.kind == kind)
    }

    pub fn entry(&self) -> Option<u64> {
        self.entry
    }

    pub fn annotations(&self) -> &[RecordedAnnotation] {
        &self.annotations
    }

    /// True when nothing has been created or recorded.
    pub fn is_empty(&self) -> bool {
        self.processor.is_none()
            && self.regions.is_empty()
            && self.mapped.is_empty()
            && self.entry.is_none()
            && self.annotations.is_empty()
    }

    /// Bytes bound at `[address, address + len)`, if fully file-backed.
    pub fn read(&self, address: u64, len: usize) -> Option<&[u8]> {
        let m = self.mapped.iter().find(|m| m.covers(address, len as u64))?;
        let start = (address - m.address) as usize;
        m.data.get(start..start + len)
    }

    pub fn read_u8(&self, address: u64) -> Option<u8> {
        self.read(address, 1).map(|b| b[0])
    }

    pub fn read_u32_le(&self, address: u64) -> Option<u32> {
        let b = self.read(address, 4)?;
        Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Rewrite bound bytes in place. Only patchable bindings accept writes.
    pub fn patch(&mut self, address: u64, bytes: &[u8]) -> Result<(), HostError> {
        let m = self
            .mapped
            .iter_mut()
            .find(|m| m.covers(address, bytes.len() as u64))
            .ok_or(HostError::Unmapped { address })?;
        if !m.flags.contains(BindFlags::PATCHABLE) {
            return Err(HostError::NotPatchable { address });
        }
        let start = (address - m.address) as usize;
        m.data[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn region_containing(&self, address: u64) -> Option<&AddressRegion> {
        self.regions.iter().find(|r| r.contains(address))
    }

    fn check_mapped(&self, address: u64, len: u32) -> Result<(), HostError> {
        let region = self
            .region_containing(address)
            .ok_or(HostError::Unmapped { address })?;
        let last = address + u64::from(len.max(1)) - 1;
        if !region.contains(last) {
            return Err(HostError::Unmapped { address: last });
        }
        Ok(())
    }
}

impl LoaderHost for MemoryImage {
    fn set_processor_model(&mut self, model: &str) -> Result<(), HostError> {
        if !self.supported_processors.iter().any(|p| p == model) {
            return Err(HostError::UnsupportedProcessor(model.to_string()));
        }
        self.processor = Some(model.to_string());
        Ok(())
    }

    fn create_region(&mut self, region: &AddressRegion) -> Result<(), HostError> {
        if region.end <= region.start {
            return Err(HostError::InvalidRange {
                start: region.start,
                end: region.end,
            });
        }
        if let Some(existing) = self.regions.iter().find(|r| r.overlaps(region)) {
            return Err(HostError::Overlap {
                start: region.start,
                end: region.end,
                existing: existing.kind,
            });
        }
        debug!(region = %region, "Host region created");
        self.regions.push(region.clone());
        Ok(())
    }

    fn bind_file_bytes(&mut self, binding: FileBinding) -> Result<(), HostError> {
        let region = self
            .region(binding.region)
            .ok_or(HostError::MissingRegion(binding.region))?;
        if binding.address < region.start || binding.end() > region.end {
            return Err(HostError::InvalidRange {
                start: binding.address,
                end: binding.end(),
            });
        }
        self.mapped.push(MappedBytes {
            address: binding.address,
            data: BytesMut::from(binding.data.as_ref()),
            flags: binding.flags,
        });
        Ok(())
    }

    fn set_entry_address(&mut self, address: u64) -> Result<(), HostError> {
        self.check_mapped(address, 1)?;
        self.entry = Some(address);
        Ok(())
    }

    fn annotate_bytes(&mut self, address: u64, len: u32) -> Result<(), HostError> {
        self.check_mapped(address, len)?;
        self.annotations.push(RecordedAnnotation {
            address,
            len,
            kind: AnnotationKind::Bytes,
        });
        Ok(())
    }

    fn annotate_ascii_string(&mut self, address: u64, len: u32) -> Result<(), HostError> {
        self.check_mapped(address, len)?;
        self.annotations.push(RecordedAnnotation {
            address,
            len,
            kind: AnnotationKind::Ascii,
        });
        Ok(())
    }

    fn abort_load(&mut self, reason: &LoaderError) {
        warn!(error = %reason, "Discarding partially loaded image");
        self.processor = None;
        self.regions.clear();
        self.mapped.clear();
        self.entry = None;
        self.annotations.clear();
    }
}
