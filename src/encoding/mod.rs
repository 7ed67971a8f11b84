//! Modules used for compressing/encoding data into containers.
pub(crate) mod bit_writer;
mod container_encoder;
pub use container_encoder::*;
pub(crate) mod util;

use alloc::vec::Vec;

use crate::huff0::CodeTableError;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeError {
    #[error("Built an invalid code table: {0}")]
    InvalidCodeTable(#[from] CodeTableError),
}

/// Encode `data` into a serialized container using the default [EncodeOptions].
pub fn compress(data: &[u8]) -> Result<Vec<u8>, EncodeError> {
    compress_with(data, EncodeOptions::default())
}

pub fn compress_with(data: &[u8], options: EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    Ok(ContainerEncoder::with_options(options).encode(data)?.to_bytes())
}
