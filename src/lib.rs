//! Gameboy Advance cartridge detection and loading for binary analysis hosts.
//!
//! Two calls per candidate file:
//! - [`probe::probe`] scores the 192-byte header and accepts or rejects the
//!   source without moving its read cursor.
//! - [`load::load`] asks a [`host::LoaderHost`] for the ARM processor, the
//!   three fixed memory regions with the ROM bytes bound, the entry address,
//!   and header annotations, and returns a [`load::LoadResult`].

/// Entry branch decoding
pub mod branch;
pub mod config;
pub mod error;
/// Header layout, checksum and cursor-preserving capture
pub mod header;
/// Host capability interface and an in-memory host
pub mod host;
pub mod io;
/// Fixed memory map
pub mod layout;
pub mod load;
pub mod logging;
/// Header scoring and the probe interface
pub mod probe;

#[cfg(feature = "python-ext")]
mod python_bindings;

pub use error::{LoaderError, Result};
pub use load::{load, LoadResult};
pub use probe::{probe, ProbeVerdict, FORMAT_LABEL};
