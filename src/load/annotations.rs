//! Header fields the host is asked to render after a load.

use crate::header::{
    CHECKSUM, DEVICE_TYPE, FIXED_BYTE, GAME_CODE, LOGO, MAIN_UNIT_CODE, MAKER_CODE,
    SOFTWARE_VERSION, TITLE,
};
use crate::layout::ROM_START;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    /// Raw byte run
    Bytes,
    /// ASCII string run
    Ascii,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderField {
    Logo,
    Title,
    GameCode,
    MakerCode,
    FixedByte,
    MainUnitCode,
    DeviceType,
    SoftwareVersion,
    Checksum,
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeaderField::Logo => "logo",
            HeaderField::Title => "title",
            HeaderField::GameCode => "game code",
            HeaderField::MakerCode => "maker code",
            HeaderField::FixedByte => "fixed byte",
            HeaderField::MainUnitCode => "main unit code",
            HeaderField::DeviceType => "device type",
            HeaderField::SoftwareVersion => "software version",
            HeaderField::Checksum => "checksum",
        };
        f.write_str(name)
    }
}

/// One rendering request, relative to the start of the ROM region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeaderAnnotation {
    pub field: HeaderField,
    pub offset: u32,
    pub len: u32,
    pub kind: AnnotationKind,
}

impl HeaderAnnotation {
    const fn new(field: HeaderField, offset: usize, len: usize, kind: AnnotationKind) -> Self {
        Self {
            field,
            offset: offset as u32,
            len: len as u32,
            kind,
        }
    }

    /// Absolute address in the loaded image.
    pub fn address(&self) -> u64 {
        ROM_START + u64::from(self.offset)
    }
}

/// Every annotation a load requests, in application order.
pub const HEADER_ANNOTATIONS: [HeaderAnnotation; 9] = [
    HeaderAnnotation::new(HeaderField::Logo, LOGO.start, LOGO.end - LOGO.start, AnnotationKind::Bytes),
    HeaderAnnotation::new(HeaderField::Title, TITLE.start, TITLE.end - TITLE.start, AnnotationKind::Ascii),
    HeaderAnnotation::new(
        HeaderField::GameCode,
        GAME_CODE.start,
        GAME_CODE.end - GAME_CODE.start,
        AnnotationKind::Ascii,
    ),
    HeaderAnnotation::new(
        HeaderField::MakerCode,
        MAKER_CODE.start,
        MAKER_CODE.end - MAKER_CODE.start,
        AnnotationKind::Ascii,
    ),
    HeaderAnnotation::new(HeaderField::FixedByte, FIXED_BYTE, 1, AnnotationKind::Bytes),
    HeaderAnnotation::new(HeaderField::MainUnitCode, MAIN_UNIT_CODE, 1, AnnotationKind::Bytes),
    HeaderAnnotation::new(HeaderField::DeviceType, DEVICE_TYPE, 1, AnnotationKind::Bytes),
    HeaderAnnotation::new(HeaderField::SoftwareVersion, SOFTWARE_VERSION, 1, AnnotationKind::Bytes),
    HeaderAnnotation::new(HeaderField::Checksum, CHECKSUM, 1, AnnotationKind::Bytes),
];
