//! Weighted header signals and the accept threshold.
//!
//! Every check is independent and contributes a fixed weight. The weights and
//! the threshold are part of the detection contract and are not tunable.

use crate::branch::{branch_target, is_branch_always};
use crate::header::{RawHeader, FIXED_BYTE_VALUE, HEADER_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Minimum clamped score for a positive match.
pub const MATCH_THRESHOLD: i32 = 8;

/// Canonical entry branch destination: the first byte after the header.
pub const HEADER_END: u32 = HEADER_SIZE as u32;

/// A single scored observation about the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSignal {
    /// Entry word is an unconditional `B`
    BranchOpcode,
    /// Entry branch lands exactly past the header
    BranchPastHeader,
    /// Entry branch lands beyond the end of the file
    BranchOutsideFile,
    /// Entry word is not an unconditional `B`
    NotABranch,
    /// Logo bitmap matches the reference
    Logo,
    /// Stored checksum matches the computed one
    Checksum,
    Title,
    GameCode,
    MakerCode,
    FixedByte,
}

impl ScoreSignal {
    pub fn weight(self) -> i32 {
        match self {
            ScoreSignal::BranchOpcode => 2,
            ScoreSignal::BranchPastHeader => 2,
            ScoreSignal::BranchOutsideFile => -2,
            ScoreSignal::NotABranch => -4,
            ScoreSignal::Logo => 2,
            ScoreSignal::Checksum => 4,
            ScoreSignal::Title
            | ScoreSignal::GameCode
            | ScoreSignal::MakerCode
            | ScoreSignal::FixedByte => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScoreSignal::BranchOpcode => "branch_opcode",
            ScoreSignal::BranchPastHeader => "branch_past_header",
            ScoreSignal::BranchOutsideFile => "branch_outside_file",
            ScoreSignal::NotABranch => "not_a_branch",
            ScoreSignal::Logo => "logo",
            ScoreSignal::Checksum => "checksum",
            ScoreSignal::Title => "title",
            ScoreSignal::GameCode => "game_code",
            ScoreSignal::MakerCode => "maker_code",
            ScoreSignal::FixedByte => "fixed_byte",
        }
    }
}

impl fmt::Display for ScoreSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:+})", self.name(), self.weight())
    }
}

/// Accumulated score with its per-signal breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderScore {
    /// Signed sum of all signal weights, before clamping
    pub raw: i32,
    /// Signals that fired, in evaluation order
    pub signals: Vec<ScoreSignal>,
}

impl HeaderScore {
    fn new() -> Self {
        Self {
            raw: 0,
            signals: Vec::new(),
        }
    }

    fn push(&mut self, signal: ScoreSignal) {
        debug!(signal = signal.name(), weight = signal.weight(), "Header signal");
        self.raw += signal.weight();
        self.signals.push(signal);
    }

    /// Score clamped to zero, as compared against the threshold.
    pub fn value(&self) -> i32 {
        self.raw.max(0)
    }

    pub fn is_match(&self) -> bool {
        self.value() >= MATCH_THRESHOLD
    }

    pub fn has(&self, signal: ScoreSignal) -> bool {
        self.signals.contains(&signal)
    }
}

/// True if every byte is a digit, an uppercase letter, or a space.
///
/// Variable-length fields are NUL padded, so NUL is also allowed anywhere
/// when `variable_length` is set.
pub fn is_uppercase_alnum(data: &[u8], variable_length: bool) -> bool {
    data.iter().all(|&b| {
        b.is_ascii_digit() || b.is_ascii_uppercase() || b == b' ' || (variable_length && b == 0)
    })
}

/// Confidence scorer over a captured header.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignatureScorer;

impl SignatureScorer {
    /// Score `header` taken from a source of `source_len` bytes.
    pub fn score(&self, header: &RawHeader, source_len: u64) -> HeaderScore {
        let mut score = HeaderScore::new();

        let entry_word = header.entry_word();
        if is_branch_always(entry_word) {
            score.push(ScoreSignal::BranchOpcode);
            // The branch-always gate implies the decoder's match bits.
            if let Some(dest) = branch_target(0, entry_word) {
                if dest == HEADER_END {
                    score.push(ScoreSignal::BranchPastHeader);
                } else if u64::from(dest) >= source_len {
                    score.push(ScoreSignal::BranchOutsideFile);
                }
            }
        } else {
            score.push(ScoreSignal::NotABranch);
        }

        if header.has_reference_logo() {
            score.push(ScoreSignal::Logo);
        }

        // Strongest single indicator of a real header.
        if header.checksum_valid() {
            score.push(ScoreSignal::Checksum);
        }

        if is_uppercase_alnum(header.title(), true) {
            score.push(ScoreSignal::Title);
        }
        if is_uppercase_alnum(header.game_code(), false) {
            score.push(ScoreSignal::GameCode);
        }
        if is_uppercase_alnum(header.maker_code(), false) {
            score.push(ScoreSignal::MakerCode);
        }

        if header.fixed_byte() == FIXED_BYTE_VALUE {
            score.push(ScoreSignal::FixedByte);
        }

        score
    }
}

/// Public API: score a header with the default scorer.
pub fn score(header: &RawHeader, source_len: u64) -> HeaderScore {
    SignatureScorer.score(header, source_len)
}
