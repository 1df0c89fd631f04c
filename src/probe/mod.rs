//! Read-only format probe.
//!
//! A probe never fails: short sources, unsupported candidate indices, low
//! scores and unreadable sources all produce a negative verdict so the host
//! can move on to other detectors.

pub mod score;

use crate::config::IOConfig;
use crate::error::{LoaderError, Result};
use crate::header::{HeaderScanner, HEADER_SIZE};
use crate::io::SafeReader;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use score::{HeaderScore, ScoreSignal, SignatureScorer, MATCH_THRESHOLD};

/// Label reported for an accepted source.
pub const FORMAT_LABEL: &str = "Gameboy Advance ROM";

/// The only candidate index this format offers.
pub const CANDIDATE_INDEX: u32 = 0;

/// Why a probe returned a negative verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    /// Only candidate index 0 exists
    UnsupportedVariant { index: u32 },
    /// Source too short to hold a header
    ShortRead { found: u64 },
    /// Header scored below the threshold
    BelowThreshold { score: i32 },
    /// Source could not be opened or read
    Unreadable { reason: String },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::UnsupportedVariant { index } => {
                write!(f, "candidate index {} is not offered", index)
            }
            Mismatch::ShortRead { found } => write!(
                f,
                "source holds {} bytes, header needs {}",
                found, HEADER_SIZE
            ),
            Mismatch::BelowThreshold { score } => write!(
                f,
                "header score {} is below threshold {}",
                score, MATCH_THRESHOLD
            ),
            Mismatch::Unreadable { reason } => write!(f, "source is unreadable: {}", reason),
        }
    }
}

/// Outcome of a probe call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeVerdict {
    pub matched: bool,
    /// Score breakdown; `None` when no header was read
    pub score: Option<HeaderScore>,
    /// Set when `matched` is false
    pub mismatch: Option<Mismatch>,
}

impl ProbeVerdict {
    fn rejected(mismatch: Mismatch, score: Option<HeaderScore>) -> Self {
        Self {
            matched: false,
            score,
            mismatch: Some(mismatch),
        }
    }

    /// `Some(FORMAT_LABEL)` on a match.
    pub fn format_label(&self) -> Option<&'static str> {
        self.matched.then_some(FORMAT_LABEL)
    }

    /// Clamped score, zero when no header was read.
    pub fn score_value(&self) -> i32 {
        self.score.as_ref().map_or(0, HeaderScore::value)
    }

    /// Turn a negative verdict into `LoaderError::FormatMismatch`.
    pub fn ensure_matched(self) -> Result<Self> {
        if self.matched {
            return Ok(self);
        }
        let score = self.score_value();
        let mismatch = self
            .mismatch
            .unwrap_or(Mismatch::BelowThreshold { score });
        Err(LoaderError::FormatMismatch(mismatch))
    }
}

/// Probe `source` for candidate `candidate_index`.
///
/// The source's read position is the same on return as on entry, whatever
/// the outcome. I/O failures become [`Mismatch::Unreadable`].
pub fn probe<S: Read + Seek + ?Sized>(source: &mut S, candidate_index: u32) -> ProbeVerdict {
    if candidate_index != CANDIDATE_INDEX {
        return ProbeVerdict::rejected(
            Mismatch::UnsupportedVariant {
                index: candidate_index,
            },
            None,
        );
    }

    let scanned = match HeaderScanner::scan(source) {
        Ok(scanned) => scanned,
        Err(LoaderError::ShortRead { found, .. }) => {
            return ProbeVerdict::rejected(Mismatch::ShortRead { found }, None);
        }
        Err(e) => return unreadable(&e),
    };

    let score = SignatureScorer.score(&scanned.header, scanned.source_len);
    if !score.is_match() {
        debug!(
            score = score.raw,
            source_len = scanned.source_len,
            "Header below match threshold"
        );
        let value = score.value();
        return ProbeVerdict::rejected(Mismatch::BelowThreshold { score: value }, Some(score));
    }

    info!(
        score = score.raw,
        title = %scanned.header.title_lossy(),
        source_len = scanned.source_len,
        "Accepted {}", FORMAT_LABEL
    );
    ProbeVerdict {
        matched: true,
        score: Some(score),
        mismatch: None,
    }
}

fn unreadable(err: &dyn std::error::Error) -> ProbeVerdict {
    warn!(error = %err, "Probe could not read source");
    ProbeVerdict::rejected(
        Mismatch::Unreadable {
            reason: err.to_string(),
        },
        None,
    )
}

/// Probe an in-memory buffer.
pub fn probe_bytes(data: &[u8]) -> ProbeVerdict {
    probe(&mut std::io::Cursor::new(data), CANDIDATE_INDEX)
}

/// Probe a file on disk through a bounded, memory-mapped reader.
///
/// Files that cannot be opened, or exceed `config.max_file_size`, are
/// reported as [`Mismatch::Unreadable`].
pub fn probe_path<P: AsRef<Path>>(path: P, config: &IOConfig) -> ProbeVerdict {
    match SafeReader::open(path, config.limits()) {
        Ok(mut reader) => probe(&mut reader, CANDIDATE_INDEX),
        Err(e) => unreadable(&e),
    }
}

/// Probe many files in parallel. Each file gets its own reader and scorer.
pub fn probe_paths(paths: &[PathBuf], config: &IOConfig) -> Vec<(PathBuf, ProbeVerdict)> {
    paths
        .par_iter()
        .map(|p| (p.clone(), probe_path(p, config)))
        .collect()
}
