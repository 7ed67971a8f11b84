use alloc::vec::Vec;

use super::bit_reader::BitReader;
use super::errors::{CorruptContainerError, DecodeError};
use crate::container::Container;
use crate::huff0::HuffmanDecoder;

/// Decode the payload of a parsed container back into the original bytes.
///
/// The whole payload has to be used up: after the last symbol only zero padding up to the
/// next byte boundary may follow. When the container carries a checksum and the `hash`
/// feature is enabled, the decoded bytes are checked against it.
pub fn decode_container(container: &Container) -> Result<Vec<u8>, DecodeError> {
    use CorruptContainerError as err;

    let original_len = container.original_len();
    let payload = container.payload();

    if original_len == 0 {
        if !payload.is_empty() {
            return Err(err::TrailingBytes {
                extra: payload.len(),
            }
            .into());
        }
        return Ok(Vec::new());
    }

    let tree = container.header().tree.as_ref().ok_or(err::MissingTree)?;

    // every symbol needs at least one bit
    let payload_bits = payload.len() as u64 * 8;
    if original_len > payload_bits {
        return Err(err::LengthExceedsPayload {
            original_len,
            payload_bits,
        }
        .into());
    }
    let count = usize::try_from(original_len).map_err(|_| err::LengthTooLarge { original_len })?;

    let mut br = BitReader::new(payload);
    let mut decoder = HuffmanDecoder::new(tree);
    let mut output = Vec::new();
    decoder
        .decode_all(&mut br, count, &mut output)
        .map_err(err::Bitstream)?;

    let (padding, padding_bits) = br.skip_to_byte();
    if padding != 0 {
        return Err(err::NonZeroPadding { got: padding }.into());
    }
    let extra = payload.len() - br.bytes_consumed();
    if extra != 0 {
        return Err(err::TrailingBytes { extra }.into());
    }

    verify_checksum(container, &output)?;

    tracing::trace!(
        payload_bits = br.bits_read() - padding_bits,
        decoded = output.len(),
        "decoded container"
    );
    Ok(output)
}

#[cfg(feature = "hash")]
fn verify_checksum(container: &Container, output: &[u8]) -> Result<(), CorruptContainerError> {
    if let Some(expected) = container.checksum() {
        let got = crate::common::content_checksum(output);
        if got != expected {
            return Err(CorruptContainerError::ChecksumMismatch { expected, got });
        }
    }
    Ok(())
}

#[cfg(not(feature = "hash"))]
fn verify_checksum(_container: &Container, _output: &[u8]) -> Result<(), CorruptContainerError> {
    Ok(())
}

/// Parse and decode a serialized container.
pub fn decompress(source: &[u8]) -> Result<Vec<u8>, DecodeError> {
    Container::parse(source)?.decode()
}
