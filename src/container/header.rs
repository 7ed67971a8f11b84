use alloc::vec::Vec;

use crate::common::{FIXED_HEADER_SIZE, MAGIC_NUM, VERSION};
use crate::decoding::bit_reader::BitReader;
use crate::decoding::errors::{CorruptContainerError, DecodeError};
use crate::encoding::bit_writer::BitWriter;
use crate::encoding::util::find_min_size;
use crate::huff0::HuffmanTree;

/// The descriptor byte following the version
///
/// - bits 0-1: width of the original length field (1, 2, 4 or 8 bytes)
/// - bit 2: content checksum present
/// - bits 3-7: reserved, must be zero
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Descriptor(pub u8);

impl Descriptor {
    const CHECKSUM_BIT: u8 = 0b100;
    const RESERVED_BITS: u8 = 0b1111_1000;

    pub fn new(original_len: u64, content_checksum: bool) -> Descriptor {
        let width_flag = match find_min_size(original_len) {
            1 => 0,
            2 => 1,
            4 => 2,
            _ => 3,
        };
        let checksum = if content_checksum { Self::CHECKSUM_BIT } else { 0 };
        Descriptor(width_flag | checksum)
    }

    pub fn length_width_flag(&self) -> u8 {
        self.0 & 0x3
    }

    pub fn content_checksum_flag(&self) -> bool {
        self.0 & Self::CHECKSUM_BIT != 0
    }

    pub fn reserved_bits(&self) -> u8 {
        self.0 & Self::RESERVED_BITS
    }

    /// Number of bytes used by the original length field
    pub fn length_bytes(&self) -> usize {
        match self.length_width_flag() {
            0 => 1,
            1 => 2,
            2 => 4,
            _ => 8,
        }
    }
}

/// Everything in front of the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    pub version: u8,
    pub descriptor: Descriptor,
    /// Number of bytes the payload decodes to
    pub original_len: u64,
    /// The decode tree. Absent exactly when `original_len` is zero.
    pub tree: Option<HuffmanTree>,
}

impl ContainerHeader {
    pub fn new(original_len: u64, tree: Option<HuffmanTree>, content_checksum: bool) -> Self {
        debug_assert_eq!(original_len == 0, tree.is_none());
        ContainerHeader {
            version: VERSION,
            descriptor: Descriptor::new(original_len, content_checksum),
            original_len,
            tree,
        }
    }

    /// Append the serialized header to `output`
    pub fn serialize(&self, output: &mut Vec<u8>) {
        output.extend_from_slice(&MAGIC_NUM.to_le_bytes());
        output.push(self.version);
        output.push(self.descriptor.0);

        let width = self.descriptor.length_bytes();
        debug_assert!(find_min_size(self.original_len) <= width);
        output.extend_from_slice(&self.original_len.to_le_bytes()[..width]);

        if let Some(tree) = &self.tree {
            let mut writer = BitWriter::from(core::mem::take(output));
            tree.write_shape(&mut writer);
            *output = writer.dump();
        }
    }

    /// Parse a header from the start of `source`, returning it along with the number of bytes it used.
    pub fn parse(source: &[u8]) -> Result<(ContainerHeader, usize), DecodeError> {
        use CorruptContainerError as err;

        if source.len() < 4 {
            return Err(err::HeaderTooShort {
                got: source.len(),
                need: FIXED_HEADER_SIZE,
            }
            .into());
        }
        let magic_num = u32::from_le_bytes([source[0], source[1], source[2], source[3]]);
        if magic_num != MAGIC_NUM {
            return Err(DecodeError::BadMagicNumber(magic_num));
        }
        if source.len() < FIXED_HEADER_SIZE {
            return Err(err::HeaderTooShort {
                got: source.len(),
                need: FIXED_HEADER_SIZE,
            }
            .into());
        }

        let version = source[4];
        if version != VERSION {
            return Err(DecodeError::UnsupportedVersion { got: version });
        }

        let descriptor = Descriptor(source[5]);
        if descriptor.reserved_bits() != 0 {
            return Err(err::ReservedBitsSet {
                descriptor: descriptor.0,
            }
            .into());
        }

        let width = descriptor.length_bytes();
        let mut bytes_read = FIXED_HEADER_SIZE;
        let need = bytes_read + width;
        if source.len() < need {
            return Err(err::HeaderTooShort {
                got: source.len(),
                need,
            }
            .into());
        }
        let mut original_len = 0u64;
        for (idx, byte) in source[bytes_read..need].iter().enumerate() {
            original_len |= u64::from(*byte) << (8 * idx);
        }
        bytes_read = need;
        if original_len == 0 && descriptor.content_checksum_flag() {
            return Err(err::ChecksumOnEmpty.into());
        }

        let tree = if original_len == 0 {
            None
        } else {
            let mut br = BitReader::new(&source[bytes_read..]);
            let tree = HuffmanTree::read_shape(&mut br).map_err(err::BadTree)?;
            bytes_read += br.bytes_consumed();
            Some(tree)
        };

        Ok((
            ContainerHeader {
                version,
                descriptor,
                original_len,
                tree,
            },
            bytes_read,
        ))
    }
}
