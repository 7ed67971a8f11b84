//! Turns a byte buffer into a [Container]

use alloc::vec::Vec;

use super::bit_writer::BitWriter;
use super::EncodeError;
use crate::container::{Container, ContainerHeader};
use crate::huff0::{FrequencyTable, HuffmanEncoder, HuffmanTree};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Append a content checksum. Only honoured when the `hash` feature is enabled.
    pub checksum: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            checksum: cfg!(feature = "hash"),
        }
    }
}

/// Encodes whole buffers into containers.
///
/// Every call to [ContainerEncoder::encode] builds its own frequency table, tree and code
/// table, so a single encoder can be shared between threads.
///
/// # Examples
/// ```
/// use huffpack::encoding::{ContainerEncoder, EncodeOptions};
/// let encoder = ContainerEncoder::with_options(EncodeOptions { checksum: false });
/// let container = encoder.encode(b"aaaabbbccd").unwrap();
/// assert_eq!(container.original_len(), 10);
/// assert_eq!(container.decode().unwrap(), b"aaaabbbccd");
/// ```
#[derive(Debug, Default, Clone)]
pub struct ContainerEncoder {
    options: EncodeOptions,
}

impl ContainerEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EncodeOptions) -> Self {
        ContainerEncoder { options }
    }

    pub fn options(&self) -> EncodeOptions {
        self.options
    }

    /// Encode `data` into a container. Never fails because of the content of `data`,
    /// an error means an internal invariant was violated.
    pub fn encode(&self, data: &[u8]) -> Result<Container, EncodeError> {
        let frequencies = FrequencyTable::from_bytes(data);
        let Some(tree) = HuffmanTree::from_frequencies(&frequencies) else {
            tracing::debug!("encoding empty input");
            return Ok(Container::new(
                ContainerHeader::new(0, None, false),
                Vec::new(),
                None,
            ));
        };

        let encoder = HuffmanEncoder::new(tree)?;
        let payload_bits = encoder.table().encoded_bit_len(&frequencies)?;
        let mut writer = BitWriter::from(Vec::with_capacity(payload_bits.div_ceil(8) as usize));
        let written = encoder.encode(data, &mut writer)?;
        debug_assert_eq!(written, payload_bits);
        let payload = writer.dump();

        let checksum = self.checksum_for(data);
        tracing::debug!(
            input = data.len(),
            symbols = frequencies.distinct_symbols(),
            payload_bits,
            checksum = checksum.is_some(),
            "encoded container"
        );

        let header = ContainerHeader::new(
            data.len() as u64,
            Some(encoder.into_tree()),
            checksum.is_some(),
        );
        Ok(Container::new(header, payload, checksum))
    }

    #[cfg(feature = "hash")]
    fn checksum_for(&self, data: &[u8]) -> Option<u32> {
        self.options
            .checksum
            .then(|| crate::common::content_checksum(data))
    }

    #[cfg(not(feature = "hash"))]
    fn checksum_for(&self, _data: &[u8]) -> Option<u32> {
        None
    }
}
