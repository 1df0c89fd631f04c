//! Error types for the cartridge loader.
//!
//! Probing never fails on format grounds: a mismatch is a clean negative
//! verdict. Loading has no partial-success state, so every failure after the
//! probe is fatal and is reported with the last load state reached.

use crate::layout::RegionKind;
use crate::load::LoadState;
use crate::probe::Mismatch;
use thiserror::Error;

/// Main error type for loader operations.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Fewer bytes available than the fixed header needs
    #[error("Short read: needed {needed} bytes, found {found}")]
    ShortRead { needed: u64, found: u64 },

    /// The source is not a cartridge image
    #[error("Format mismatch: {0}")]
    FormatMismatch(Mismatch),

    /// The host cannot honor the mandatory processor model
    #[error("Processor model '{model}' rejected by host: {reason}")]
    ProcessorModel { model: String, reason: String },

    /// A memory region could not be created or bound
    #[error("Failed adding {region} region: {reason}")]
    RegionCreation { region: RegionKind, reason: String },

    /// The host refused the resolved entry address
    #[error("Failed setting entry address {address:#x}: {reason}")]
    EntryAddress { address: u64, reason: String },

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bounded reader errors (size or read budget)
    #[error("Bounded I/O error: {0}")]
    SafeIo(#[from] crate::io::error::IoError),

    /// Configuration parse errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A load step failed; nothing the load created survives
    #[error("Load aborted after {after}: {source}")]
    Aborted {
        after: LoadState,
        #[source]
        source: Box<LoaderError>,
    },
}

impl LoaderError {
    /// True for errors that only mean "not this format".
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            LoaderError::FormatMismatch(_) | LoaderError::ShortRead { .. }
        )
    }

    /// The innermost error, looking through `Aborted` wrappers.
    pub fn root(&self) -> &LoaderError {
        match self {
            LoaderError::Aborted { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for loader operations
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Convert loader errors to PyO3 exceptions
#[cfg(feature = "python-ext")]
impl From<LoaderError> for pyo3::PyErr {
    fn from(err: LoaderError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};

        match err.root() {
            LoaderError::Io(_) | LoaderError::SafeIo(_) => PyIOError::new_err(err.to_string()),
            LoaderError::FormatMismatch(_)
            | LoaderError::ShortRead { .. }
            | LoaderError::Config(_)
            | LoaderError::Serialization(_) => PyValueError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}
