//! End-to-end cartridge tests.

mod io;
mod load;
mod probe;
