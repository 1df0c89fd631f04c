//! Load phase: processor model, memory map, entry point, header annotations.
//!
//! A load is linear:
//! `Idle -> HeaderRead -> RegionsBuilt -> EntryResolved -> Done`.
//! Any failure moves straight to `Aborted`, the host is told to discard what
//! it created, and the error names the last state reached. There is no retry
//! or resume.

pub mod annotations;
pub mod entry;

use crate::config::{LoadConfig, LoaderConfig};
use crate::error::{LoaderError, Result};
use crate::header::HeaderScanner;
use crate::host::LoaderHost;
use crate::io::SafeReader;
use crate::layout::{AddressRegion, AddressSpaceBuilder};
use crate::probe::{probe, CANDIDATE_INDEX};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{debug, error, info, warn};

use annotations::{AnnotationKind, HeaderAnnotation, HEADER_ANNOTATIONS};
pub use entry::{EntryPoint, EntryPointResolver, EntrySource};

/// Processor module every load requests. Mandatory.
pub const PROCESSOR_MODEL: &str = "arm";

/// Progress of a single load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadState {
    Idle,
    HeaderRead,
    RegionsBuilt,
    EntryResolved,
    Done,
    Aborted,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Everything a load decided, handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadResult {
    pub processor_model: String,
    pub entry_address: u64,
    pub entry: EntryPoint,
    /// Regions in creation order
    pub regions: Vec<AddressRegion>,
    /// Annotations the host accepted, in application order; empty when
    /// annotation is disabled
    pub annotations: Vec<HeaderAnnotation>,
    /// Full source length
    pub source_len: u64,
    /// Bytes bound into ROM after truncation
    pub rom_len: u64,
}

impl LoadResult {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| LoaderError::Serialization(e.to_string()))
    }

    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str).map_err(|e| LoaderError::Serialization(e.to_string()))
    }
}

struct LoadSession<'h, H: LoaderHost + ?Sized> {
    host: &'h mut H,
    state: LoadState,
}

impl<'h, H: LoaderHost + ?Sized> LoadSession<'h, H> {
    fn new(host: &'h mut H) -> Self {
        Self {
            host,
            state: LoadState::Idle,
        }
    }

    fn advance(&mut self, next: LoadState) {
        debug!(from = %self.state, to = %next, "Load state");
        self.state = next;
    }

    fn abort(&mut self, cause: LoaderError) -> LoaderError {
        let err = LoaderError::Aborted {
            after: self.state,
            source: Box::new(cause),
        };
        self.state = LoadState::Aborted;
        error!(error = %err, "Load aborted");
        self.host.abort_load(&err);
        err
    }

    fn run<S: Read + Seek + ?Sized>(&mut self, source: &mut S, config: &LoadConfig) -> Result<LoadResult> {
        self.host
            .set_processor_model(PROCESSOR_MODEL)
            .map_err(|e| LoaderError::ProcessorModel {
                model: PROCESSOR_MODEL.to_string(),
                reason: e.to_string(),
            })?;

        let scanned = HeaderScanner::scan(source)?;
        self.advance(LoadState::HeaderRead);

        let builder = AddressSpaceBuilder::new(scanned.source_len);
        let space = builder.build(source, &mut *self.host)?;
        self.advance(LoadState::RegionsBuilt);

        let entry = EntryPointResolver::resolve(&scanned.header, space.rom_len());
        self.host
            .set_entry_address(entry.address)
            .map_err(|e| LoaderError::EntryAddress {
                address: entry.address,
                reason: e.to_string(),
            })?;
        self.advance(LoadState::EntryResolved);

        let annotations = if config.annotate_header {
            self.annotate_header()
        } else {
            Vec::new()
        };
        self.advance(LoadState::Done);

        info!(
            title = %scanned.header.title_lossy(),
            entry = format_args!("{:#x}", entry.address),
            rom_len = space.rom_len(),
            "Cartridge loaded"
        );
        Ok(LoadResult {
            processor_model: PROCESSOR_MODEL.to_string(),
            entry_address: entry.address,
            entry,
            rom_len: space.rom_len(),
            regions: space.into_regions(),
            annotations,
            source_len: scanned.source_len,
        })
    }

    // Rendering hints only; a refused annotation does not fail the load.
    fn annotate_header(&mut self) -> Vec<HeaderAnnotation> {
        let mut accepted = Vec::with_capacity(HEADER_ANNOTATIONS.len());
        for a in HEADER_ANNOTATIONS {
            let applied = match a.kind {
                AnnotationKind::Bytes => self.host.annotate_bytes(a.address(), a.len),
                AnnotationKind::Ascii => self.host.annotate_ascii_string(a.address(), a.len),
            };
            match applied {
                Ok(()) => accepted.push(a),
                Err(e) => {
                    warn!(field = %a.field, address = a.address(), error = %e, "Header annotation skipped");
                }
            }
        }
        accepted
    }
}

/// Load `source` into `host`.
///
/// Does not re-check the format; a source that was never probed still loads
/// with its own header read.
///
/// # Errors
/// Any failure aborts the whole load and returns `LoaderError::Aborted`
/// wrapping the failing step's error. `host.abort_load` has been called by
/// then.
pub fn load<S, H>(source: &mut S, host: &mut H, config: &LoadConfig) -> Result<LoadResult>
where
    S: Read + Seek + ?Sized,
    H: LoaderHost + ?Sized,
{
    let mut session = LoadSession::new(host);
    match session.run(source, config) {
        Ok(result) => Ok(result),
        Err(e) => Err(session.abort(e)),
    }
}

/// Probe first and load only on a match.
///
/// # Errors
/// `LoaderError::FormatMismatch` if the probe rejects the source, otherwise
/// as for [`load`].
pub fn load_checked<S, H>(source: &mut S, host: &mut H, config: &LoadConfig) -> Result<LoadResult>
where
    S: Read + Seek + ?Sized,
    H: LoaderHost + ?Sized,
{
    probe(source, CANDIDATE_INDEX).ensure_matched()?;
    load(source, host, config)
}

/// Load an in-memory image.
pub fn load_bytes<H: LoaderHost + ?Sized>(data: &[u8], host: &mut H, config: &LoadConfig) -> Result<LoadResult> {
    load(&mut std::io::Cursor::new(data), host, config)
}

/// Load a file on disk through a bounded, memory-mapped reader.
pub fn load_path<P, H>(path: P, host: &mut H, config: &LoaderConfig) -> Result<LoadResult>
where
    P: AsRef<Path>,
    H: LoaderHost + ?Sized,
{
    let mut reader = SafeReader::open(path, config.io.limits())?;
    load(&mut reader, host, &config.load)
}
