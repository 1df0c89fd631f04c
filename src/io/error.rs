//! Custom error types for the I/O module.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("File size of {found} bytes exceeds the maximum allowed size of {limit} bytes.")]
    FileTooLarge { limit: u64, found: u64 },

    #[error(
        "A read of {requested} bytes would exceed the total read limit of {limit} bytes. (already read: {current})"
    )]
    ReadLimitExceeded {
        limit: u64,
        current: u64,
        requested: u64,
    },

    #[error("An underlying I/O error occurred: {0}")]
    StdIo(#[from] std::io::Error),
}

impl From<IoError> for std::io::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::StdIo(e) => e,
            other => std::io::Error::other(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, IoError>;
