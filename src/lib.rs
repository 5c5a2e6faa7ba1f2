//! Codec and editing helpers for NES CHR tile graphics.

pub mod chr;
pub mod chr_file;
pub mod error;
pub mod frame;
pub mod pal;

pub use error::Error;
