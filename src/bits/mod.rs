//! Byte payloads as ordered bit strings.
//!
//! This module converts payload bytes into the canonical big-endian bit
//! order used by every frame, and back again after decoding.

mod bitstring;
mod packer;

pub use bitstring::{BitString, ParseBitsError};
pub use packer::{pack, unpack, Unpacked};
