//! Errors that might occur while decoding a container

use crate::huff0::{HuffmanDecoderError, ReadTreeError};

/// The container is structurally ours but its header and payload do not agree.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum CorruptContainerError {
    #[error("Header needs at least {need} bytes, got: {got}")]
    HeaderTooShort { got: usize, need: usize },
    #[error("Reserved bits in the descriptor are set. Descriptor: {descriptor:#010b}")]
    ReservedBitsSet { descriptor: u8 },
    #[error("Empty containers carry no checksum but the descriptor announces one")]
    ChecksumOnEmpty,
    #[error("Original length is not zero but the container has no tree")]
    MissingTree,
    #[error("Failed to read the tree section: {0}")]
    BadTree(#[source] ReadTreeError),
    #[error("Original length is {original_len} bytes but the payload only has {payload_bits} bits")]
    LengthExceedsPayload { original_len: u64, payload_bits: u64 },
    #[error("Original length of {original_len} bytes does not fit into memory on this platform")]
    LengthTooLarge { original_len: u64 },
    #[error("Failed to decode the payload: {0}")]
    Bitstream(#[source] HuffmanDecoderError),
    #[error("{extra} bytes left over after the payload")]
    TrailingBytes { extra: usize },
    #[error("Padding at the end of the payload must be zero but is: {got:#b}")]
    NonZeroPadding { got: u8 },
    #[error("Container announces a checksum but is too short to hold one")]
    MissingChecksum,
    #[error("Checksum mismatch. Container says: {expected:#010x}, decoded content has: {got:#010x}")]
    ChecksumMismatch { expected: u32, got: u32 },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("Read wrong magic number: 0x{0:X}")]
    BadMagicNumber(u32),
    #[error("Unsupported container version: {got}")]
    UnsupportedVersion { got: u8 },
    #[error("Corrupt container: {0}")]
    CorruptContainer(#[from] CorruptContainerError),
}

impl DecodeError {
    /// The input is not a container this implementation understands, as opposed to a damaged one
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            DecodeError::BadMagicNumber(_) | DecodeError::UnsupportedVersion { .. }
        )
    }
}
