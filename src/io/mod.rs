//! Bounded and safe file access for path-based probing and loading.
//!
//! `SafeReader` memory-maps a file and exposes it as a `Read + Seek` byte
//! source, so it can be handed to the probe and load phases like any other
//! stream. It enforces a file size ceiling at open time and a total read
//! budget across all reads.

pub mod error;

use crate::io::error::{IoError, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Defines the resource limits for I/O operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IOLimits {
    /// The absolute maximum file size that can be opened.
    pub max_file_size: u64,
    /// The maximum total number of bytes that can be read from the file across all operations.
    pub max_read_bytes: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            max_file_size: 1024 * 1024 * 1024, // 1GB
            max_read_bytes: 64 * 1024 * 1024,  // 64MB
        }
    }
}

/// A safe, bounded file reader that uses memory-mapping for efficient access.
pub struct SafeReader {
    path: PathBuf,
    // None when the file size is zero; memmap cannot map empty files.
    mmap: Option<Mmap>,
    limits: IOLimits,
    bytes_read: u64,
    file_size: u64,
    pos: u64,
}

impl SafeReader {
    /// Opens a file, memory-maps it, and wraps it in a `SafeReader`.
    ///
    /// This function will fail if the file size exceeds `limits.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, limits: IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let metadata = file.metadata()?;
        let file_size = metadata.len();

        debug!(
            path = %path.display(),
            size = file_size,
            limits.max_file_size = limits.max_file_size,
            "Opening file for safe reading"
        );

        if file_size > limits.max_file_size {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = limits.max_file_size,
                "File is too large"
            );
            return Err(IoError::FileTooLarge {
                limit: limits.max_file_size,
                found: file_size,
            });
        }

        let mmap = if file_size == 0 {
            None
        } else {
            // Safety: The file is backed by a real file on disk and we only request a read-only map.
            Some(unsafe { Mmap::map(&file)? })
        };

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
            limits,
            bytes_read: 0,
            file_size,
            pos: 0,
        })
    }

    /// Returns the total size of the underlying file in bytes.
    pub fn size(&self) -> u64 {
        self.file_size
    }

    /// Returns the total number of bytes read so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Returns the `IOLimits` enforced by this reader.
    pub fn limits(&self) -> &IOLimits {
        &self.limits
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn data(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }
}

impl Read for SafeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || self.pos >= self.file_size {
            return Ok(0);
        }

        let start = self.pos as usize;
        let n = std::cmp::min(buf.len() as u64, self.file_size - self.pos);

        if self.bytes_read.saturating_add(n) > self.limits.max_read_bytes {
            warn!(
                path = %self.path.display(),
                current_read = self.bytes_read,
                requested = n,
                limit = self.limits.max_read_bytes,
                "Read limit exceeded"
            );
            return Err(IoError::ReadLimitExceeded {
                limit: self.limits.max_read_bytes,
                current: self.bytes_read,
                requested: n,
            }
            .into());
        }

        let n = n as usize;
        buf[..n].copy_from_slice(&self.data()[start..start + n]);
        self.pos += n as u64;
        self.bytes_read += n as u64;

        trace!(
            path = %self.path.display(),
            offset = start,
            len = n,
            total_read = self.bytes_read,
            "Performed read"
        );
        Ok(n)
    }
}

impl Seek for SafeReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(off) => Some(off),
            SeekFrom::End(delta) => self.file_size.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };
        match target {
            Some(t) => {
                self.pos = t;
                Ok(t)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}
