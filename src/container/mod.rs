//! The self-describing unit produced by the encoder: a header that is enough to rebuild the
//! decode tree, followed by the packed bitstream and an optional content checksum.
//!
//! ```text
//! magic (4) | version (1) | descriptor (1) | original length (1/2/4/8) | tree section | payload | checksum (0/4)
//! ```

mod header;
pub use header::*;

use alloc::vec::Vec;

use crate::common::CHECKSUM_SIZE;
use crate::decoding::errors::{CorruptContainerError, DecodeError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    header: ContainerHeader,
    payload: Vec<u8>,
    checksum: Option<u32>,
}

impl Container {
    pub(crate) fn new(header: ContainerHeader, payload: Vec<u8>, checksum: Option<u32>) -> Self {
        debug_assert_eq!(header.descriptor.content_checksum_flag(), checksum.is_some());
        Container {
            header,
            payload,
            checksum,
        }
    }

    /// Split `source` into header, payload and checksum without decoding the payload.
    pub fn parse(source: &[u8]) -> Result<Container, DecodeError> {
        let (header, header_len) = ContainerHeader::parse(source)?;
        let rest = &source[header_len..];

        let (payload, checksum) = if header.descriptor.content_checksum_flag() {
            if rest.len() < CHECKSUM_SIZE {
                return Err(CorruptContainerError::MissingChecksum.into());
            }
            let (payload, checksum) = rest.split_at(rest.len() - CHECKSUM_SIZE);
            let checksum = u32::from_le_bytes([checksum[0], checksum[1], checksum[2], checksum[3]]);
            (payload, Some(checksum))
        } else {
            (rest, None)
        };

        Ok(Container {
            header,
            payload: payload.to_vec(),
            checksum,
        })
    }

    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn checksum(&self) -> Option<u32> {
        self.checksum
    }

    pub fn original_len(&self) -> u64 {
        self.header.original_len
    }

    /// Append the serialized container to `output`
    pub fn write_to(&self, output: &mut Vec<u8>) {
        self.header.serialize(output);
        output.extend_from_slice(&self.payload);
        if let Some(checksum) = self.checksum {
            output.extend_from_slice(&checksum.to_le_bytes());
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut output = Vec::with_capacity(self.payload.len() + 64);
        self.write_to(&mut output);
        output
    }

    /// Rebuild the original bytes, see [crate::decoding::decode_container]
    pub fn decode(&self) -> Result<Vec<u8>, DecodeError> {
        crate::decoding::decode_container(self)
    }
}
