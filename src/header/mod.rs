//! Cartridge header layout and field accessors.
//!
//! The header occupies the first 192 bytes of every cartridge image. All
//! multi-byte values are little-endian; text fields are fixed-width ASCII.

pub mod scanner;

use crate::error::{LoaderError, Result};
use std::fmt;
use std::ops::{Range, RangeInclusive};

pub use scanner::{CursorGuard, HeaderScanner, ScannedHeader};

/// Size of the cartridge header in bytes.
pub const HEADER_SIZE: usize = 192;

/// First 32-bit ARM instruction, normally a branch over the header.
pub const ENTRY_WORD: Range<usize> = 0x00..0x04;
/// Compressed logo bitmap.
pub const LOGO: Range<usize> = 0x04..0xA0;
/// Game title, NUL padded.
pub const TITLE: Range<usize> = 0xA0..0xAC;
/// Game code.
pub const GAME_CODE: Range<usize> = 0xAC..0xB0;
/// Maker code.
pub const MAKER_CODE: Range<usize> = 0xB0..0xB2;
pub const FIXED_BYTE: usize = 0xB2;
pub const MAIN_UNIT_CODE: usize = 0xB3;
pub const DEVICE_TYPE: usize = 0xB4;
pub const SOFTWARE_VERSION: usize = 0xBC;
pub const CHECKSUM: usize = 0xBD;

/// Bytes covered by the header checksum.
pub const CHECKSUM_SPAN: RangeInclusive<usize> = 0xA0..=0xBC;
/// Final bias subtracted from the checksum accumulator.
pub const CHECKSUM_BIAS: u8 = 0x19;
/// Required value of the fixed byte at 0xB2.
pub const FIXED_BYTE_VALUE: u8 = 0x96;

/// Reference logo bitmap every licensed cartridge carries.
pub const NINTENDO_LOGO: [u8; 156] = [
    0x24, 0xFF, 0xAE, 0x51, 0x69, 0x9A, 0xA2, 0x21, 0x3D, 0x84, 0x82, 0x0A, 0x84, 0xE4, 0x09, 0xAD,
    0x11, 0x24, 0x8B, 0x98, 0xC0, 0x81, 0x7F, 0x21, 0xA3, 0x52, 0xBE, 0x19, 0x93, 0x09, 0xCE, 0x20,
    0x10, 0x46, 0x4A, 0x4A, 0xF8, 0x27, 0x31, 0xEC, 0x58, 0xC7, 0xE8, 0x33, 0x82, 0xE3, 0xCE, 0xBF,
    0x85, 0xF4, 0xDF, 0x94, 0xCE, 0x4B, 0x09, 0xC1, 0x94, 0x56, 0x8A, 0xC0, 0x13, 0x72, 0xA7, 0xFC,
    0x9F, 0x84, 0x4D, 0x73, 0xA3, 0xCA, 0x9A, 0x61, 0x58, 0x97, 0xA3, 0x27, 0xFC, 0x03, 0x98, 0x76,
    0x23, 0x1D, 0xC7, 0x61, 0x03, 0x04, 0xAE, 0x56, 0xBF, 0x38, 0x84, 0x00, 0x40, 0xA7, 0x0E, 0xFD,
    0xFF, 0x52, 0xFE, 0x03, 0x6F, 0x95, 0x30, 0xF1, 0x97, 0xFB, 0xC0, 0x85, 0x60, 0xD6, 0x80, 0x25,
    0xA9, 0x63, 0xBE, 0x03, 0x01, 0x4E, 0x38, 0xE2, 0xF9, 0xA2, 0x34, 0xFF, 0xBB, 0x3E, 0x03, 0x44,
    0x78, 0x00, 0x90, 0xCB, 0x88, 0x11, 0x3A, 0x94, 0x65, 0xC0, 0x7C, 0x63, 0x87, 0xF0, 0x3C, 0xAF,
    0xD6, 0x25, 0xE4, 0x8B, 0x38, 0x0A, 0xAC, 0x72, 0x21, 0xD4, 0xF8, 0x07,
];

/// Compute the complement check over `CHECKSUM_SPAN`.
///
/// Starts at zero, subtracts every covered byte and then the bias, all
/// modulo 256.
pub fn header_checksum(bytes: &[u8; HEADER_SIZE]) -> u8 {
    bytes[CHECKSUM_SPAN]
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_sub(*b))
        .wrapping_sub(CHECKSUM_BIAS)
}

/// The first 192 bytes of a candidate file. Immutable once captured.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RawHeader {
    bytes: [u8; HEADER_SIZE],
}

impl RawHeader {
    pub fn new(bytes: [u8; HEADER_SIZE]) -> Self {
        Self { bytes }
    }

    /// Capture a header from the start of `data`.
    ///
    /// # Errors
    /// Returns `LoaderError::ShortRead` if `data` holds fewer than 192 bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let bytes: [u8; HEADER_SIZE] = data
            .get(..HEADER_SIZE)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| LoaderError::ShortRead {
                needed: HEADER_SIZE as u64,
                found: data.len() as u64,
            })?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; HEADER_SIZE] {
        &self.bytes
    }

    /// First instruction word, little-endian.
    pub fn entry_word(&self) -> u32 {
        u32::from_le_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }

    pub fn logo(&self) -> &[u8] {
        &self.bytes[LOGO]
    }

    pub fn title(&self) -> &[u8] {
        &self.bytes[TITLE]
    }

    pub fn game_code(&self) -> &[u8] {
        &self.bytes[GAME_CODE]
    }

    pub fn maker_code(&self) -> &[u8] {
        &self.bytes[MAKER_CODE]
    }

    pub fn fixed_byte(&self) -> u8 {
        self.bytes[FIXED_BYTE]
    }

    pub fn main_unit_code(&self) -> u8 {
        self.bytes[MAIN_UNIT_CODE]
    }

    pub fn device_type(&self) -> u8 {
        self.bytes[DEVICE_TYPE]
    }

    pub fn software_version(&self) -> u8 {
        self.bytes[SOFTWARE_VERSION]
    }

    /// Stored checksum byte.
    pub fn checksum(&self) -> u8 {
        self.bytes[CHECKSUM]
    }

    /// Checksum recomputed from the header contents.
    pub fn computed_checksum(&self) -> u8 {
        header_checksum(&self.bytes)
    }

    pub fn has_reference_logo(&self) -> bool {
        self.logo() == NINTENDO_LOGO
    }

    pub fn checksum_valid(&self) -> bool {
        self.computed_checksum() == self.checksum()
    }

    /// Title with trailing NUL padding removed, for display.
    pub fn title_lossy(&self) -> String {
        let title = self.title();
        let end = title.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        String::from_utf8_lossy(&title[..end]).into_owned()
    }
}

impl fmt::Debug for RawHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawHeader")
            .field("entry_word", &format_args!("{:#010x}", self.entry_word()))
            .field("title", &self.title_lossy())
            .field("game_code", &String::from_utf8_lossy(self.game_code()))
            .field("maker_code", &String::from_utf8_lossy(self.maker_code()))
            .field("checksum", &format_args!("{:#04x}", self.checksum()))
            .finish()
    }
}
