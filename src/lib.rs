//! A static-tree Huffman codec.
//!
//! Every input buffer gets its own tree, built deterministically from the byte frequencies
//! of that buffer. The tree travels with the packed bitstream in a small self-describing
//! container, so decoding needs nothing but the container bytes.
//!
//! ```
//! let encoded = huffpack::encode(b"aaaabbbccd").unwrap();
//! assert_eq!(huffpack::decode(&encoded).unwrap(), b"aaaabbbccd");
//! ```
//!
//! The lower layers are exposed too: [huff0] has the frequency table, tree, code table and the
//! bit level encoder/decoder, [container] the header and container types.
//!
//! # Features
//! * `std` (default): turns on the `std` support of `thiserror` and `tracing`
//! * `hash` (default): writes and verifies the XXH64 based content checksum
//! * `fuzz_exports`: exposes `huff0::round_trip` for the fuzz targets
#![no_std]
#![deny(trivial_casts, trivial_numeric_casts, rust_2018_idioms)]

#[cfg(any(test, feature = "std"))]
extern crate std;

extern crate alloc;

pub mod common;
pub mod container;
pub mod decoding;
pub mod encoding;
pub mod huff0;
mod tests;

use alloc::vec::Vec;

pub use container::{Container, ContainerHeader, Descriptor};
pub use decoding::errors::{CorruptContainerError, DecodeError};
pub use encoding::{ContainerEncoder, EncodeError, EncodeOptions};

/// Encode `data` into a serialized container, with a content checksum if the `hash`
/// feature is enabled.
pub fn encode(data: &[u8]) -> Result<Vec<u8>, EncodeError> {
    encoding::compress(data)
}

/// Decode a serialized container produced by [encode].
pub fn decode(container: &[u8]) -> Result<Vec<u8>, DecodeError> {
    decoding::decompress(container)
}
