//! Header capture that leaves the caller's stream position untouched.
//!
//! The same source is usually handed to several format detectors in turn, so
//! any read cursor movement here must be undone whatever the outcome.

use super::{RawHeader, HEADER_SIZE};
use crate::error::{LoaderError, Result};
use std::io::{self, Read, Seek, SeekFrom};
use std::ops::{Deref, DerefMut};
use tracing::{debug, trace, warn};

/// Scoped guard that restores a stream's position when dropped.
///
/// Call [`CursorGuard::restore`] to observe restore failures; the `Drop`
/// path can only log them.
pub struct CursorGuard<'a, S: Seek + ?Sized> {
    source: &'a mut S,
    origin: u64,
    restored: bool,
}

impl<'a, S: Seek + ?Sized> CursorGuard<'a, S> {
    /// Record the current position of `source`.
    pub fn new(source: &'a mut S) -> io::Result<Self> {
        let origin = source.stream_position()?;
        Ok(Self {
            source,
            origin,
            restored: false,
        })
    }

    /// Position recorded when the guard was created.
    pub fn origin(&self) -> u64 {
        self.origin
    }

    /// Seek back to the recorded position, reporting any failure.
    pub fn restore(mut self) -> io::Result<()> {
        self.restored = true;
        self.source.seek(SeekFrom::Start(self.origin)).map(|_| ())
    }
}

impl<S: Seek + ?Sized> Deref for CursorGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.source
    }
}

impl<S: Seek + ?Sized> DerefMut for CursorGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.source
    }
}

impl<S: Seek + ?Sized> Drop for CursorGuard<'_, S> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = self.source.seek(SeekFrom::Start(self.origin)) {
            warn!(origin = self.origin, error = %e, "Failed to restore stream position");
        }
    }
}

/// Header bytes plus the total length of the source they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedHeader {
    pub header: RawHeader,
    /// Full length of the source, before any ROM-size capping.
    pub source_len: u64,
}

/// Reads the first 192 bytes of a seekable source.
pub struct HeaderScanner;

impl HeaderScanner {
    /// Total length of `source`, leaving its position unchanged.
    pub fn source_len<S: Seek + ?Sized>(source: &mut S) -> io::Result<u64> {
        let mut guard = CursorGuard::new(source)?;
        let len = guard.seek(SeekFrom::End(0))?;
        guard.restore()?;
        Ok(len)
    }

    /// Capture the header from offset 0 without disturbing the read cursor.
    ///
    /// The length check happens before any byte is read, so a short source is
    /// rejected without touching its contents.
    ///
    /// # Errors
    /// `LoaderError::ShortRead` when fewer than 192 bytes exist, or
    /// `LoaderError::Io` on seek/read failure.
    pub fn scan<S: Read + Seek + ?Sized>(source: &mut S) -> Result<ScannedHeader> {
        let mut guard = CursorGuard::new(source)?;
        let source_len = guard.seek(SeekFrom::End(0))?;
        if source_len < HEADER_SIZE as u64 {
            debug!(source_len, "Source shorter than cartridge header");
            guard.restore()?;
            return Err(LoaderError::ShortRead {
                needed: HEADER_SIZE as u64,
                found: source_len,
            });
        }

        guard.seek(SeekFrom::Start(0))?;
        let mut bytes = [0u8; HEADER_SIZE];
        guard.read_exact(&mut bytes).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => LoaderError::ShortRead {
                needed: HEADER_SIZE as u64,
                found: source_len,
            },
            _ => LoaderError::Io(e),
        })?;
        let origin = guard.origin();
        guard.restore()?;

        trace!(source_len, origin, "Captured cartridge header");
        Ok(ScannedHeader {
            header: RawHeader::new(bytes),
            source_len,
        })
    }
}
