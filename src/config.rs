//! Configuration for the loader.
//!
//! Only ambient behavior is configurable. The scoring weights, threshold,
//! memory map and ROM size cap are fixed by the cartridge format.

use crate::error::{LoaderError, Result};
use crate::io::IOLimits;
use serde::{Deserialize, Serialize};

#[cfg(feature = "python-ext")]
use pyo3::prelude::*;

/// Master configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "python-ext", pyclass)]
pub struct LoaderConfig {
    /// Limits applied when opening files by path.
    #[cfg_attr(feature = "python-ext", pyo3(get, set))]
    pub io: IOConfig,
    /// Load-phase options.
    #[cfg_attr(feature = "python-ext", pyo3(get, set))]
    pub load: LoadConfig,
}

impl LoaderConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LoaderError::Config(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LoaderError::Serialization(e.to_string()))
    }
}

#[cfg(feature = "python-ext")]
#[pymethods]
impl LoaderConfig {
    #[new]
    pub fn new() -> Self {
        Self::default()
    }
}

/// I/O limits for path-based entry points.
///
/// These only apply to `probe_path`, `probe_paths` and `load_path`. A file
/// above `max_file_size` is never opened: detection reports it as unreadable
/// and `load_path` fails with `FileTooLarge`. Files between the 32 MiB ROM cap
/// and this ceiling load with their ROM truncated. Raise the ceiling to
/// truncate larger files. Stream-based `probe` and `load` have no ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "python-ext", pyclass)]
pub struct IOConfig {
    /// Maximum file size to open (default: 1073741824 = 1GB).
    #[cfg_attr(feature = "python-ext", pyo3(get, set))]
    pub max_file_size: u64,
    /// Maximum bytes read from one file (default: 67108864 = 64MB).
    #[cfg_attr(feature = "python-ext", pyo3(get, set))]
    pub max_read_bytes: u64,
}

impl Default for IOConfig {
    fn default() -> Self {
        Self {
            max_file_size: 1024 * 1024 * 1024, // 1GB
            max_read_bytes: 64 * 1024 * 1024,  // 64MB
        }
    }
}

impl IOConfig {
    pub fn limits(&self) -> IOLimits {
        IOLimits {
            max_file_size: self.max_file_size,
            max_read_bytes: self.max_read_bytes,
        }
    }
}

/// Load-phase options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "python-ext", pyclass)]
pub struct LoadConfig {
    /// Ask the host to render the header fields (default: true).
    #[cfg_attr(feature = "python-ext", pyo3(get, set))]
    pub annotate_header: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            annotate_header: true,
        }
    }
}
