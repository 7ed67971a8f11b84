/// Reads bits most significant bit first, the mirror image of `BitWriter`.
pub struct BitReader<'s> {
    idx: usize, //index counts bits already read
    source: &'s [u8],
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum GetBitsError {
    #[error("Cant serve this request. The reader is limited to {limit} bits, requested {num_requested_bits} bits")]
    TooManyBits {
        num_requested_bits: usize,
        limit: u8,
    },
    #[error("Can't read {requested} bits, only have {remaining} bits left")]
    NotEnoughRemainingBits { requested: usize, remaining: usize },
}

impl<'s> BitReader<'s> {
    pub fn new(source: &'s [u8]) -> BitReader<'s> {
        BitReader { idx: 0, source }
    }

    pub fn bits_left(&self) -> usize {
        self.source.len() * 8 - self.idx
    }

    pub fn bits_read(&self) -> usize {
        self.idx
    }

    /// Bytes touched so far, counting a partially read byte as a whole one
    pub fn bytes_consumed(&self) -> usize {
        self.idx.div_ceil(8)
    }

    pub fn get_bit(&mut self) -> Result<bool, GetBitsError> {
        if self.idx >= self.source.len() * 8 {
            return Err(GetBitsError::NotEnoughRemainingBits {
                requested: 1,
                remaining: 0,
            });
        }
        let byte = self.source[self.idx / 8];
        let bit = (byte >> (7 - self.idx % 8)) & 1;
        self.idx += 1;
        Ok(bit == 1)
    }

    /// Read `n` bits as an unsigned number, the first bit read being the most significant.
    pub fn get_bits(&mut self, n: usize) -> Result<u64, GetBitsError> {
        if n > 64 {
            return Err(GetBitsError::TooManyBits {
                num_requested_bits: n,
                limit: 64,
            });
        }
        if self.bits_left() < n {
            return Err(GetBitsError::NotEnoughRemainingBits {
                requested: n,
                remaining: self.bits_left(),
            });
        }

        let mut value = 0u64;
        let mut remaining = n;
        while remaining > 0 {
            let bits_left_in_current_byte = 8 - (self.idx % 8);
            let take = bits_left_in_current_byte.min(remaining);
            let shift = bits_left_in_current_byte - take;
            let chunk = (self.source[self.idx / 8] >> shift) & ((1u16 << take) - 1) as u8;

            // take is at most 8, so the shift below never loses bits that matter
            value = (value << take) | u64::from(chunk);
            self.idx += take;
            remaining -= take;
        }

        Ok(value)
    }

    /// Skip to the next byte boundary, returning the skipped bits.
    ///
    /// The skipped bits are returned in the low end of the value, the number of
    /// skipped bits in the second slot.
    pub fn skip_to_byte(&mut self) -> (u8, usize) {
        let skipped = (8 - self.idx % 8) % 8;
        // never fails: the skipped bits are part of the current byte
        let bits = self.get_bits(skipped).unwrap_or(0) as u8;
        (bits, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::{BitReader, GetBitsError};

    #[test]
    fn reads_msb_first() {
        let mut br = BitReader::new(&[0b1010_0000]);
        assert!(br.get_bit().unwrap());
        assert!(!br.get_bit().unwrap());
        assert!(br.get_bit().unwrap());
        assert_eq!(br.bits_read(), 3);
        assert_eq!(br.bits_left(), 5);
    }

    #[test]
    fn multi_byte_reads() {
        let mut br = BitReader::new(&[0x0f, 0xff, 0xf0]);
        assert_eq!(br.get_bits(4).unwrap(), 0);
        assert_eq!(br.get_bits(16).unwrap(), 0xffff);
        assert_eq!(br.get_bits(4).unwrap(), 0);
        assert_eq!(br.bits_left(), 0);
    }

    #[test]
    fn full_width_read() {
        let source = [0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0, 0xff];
        let mut br = BitReader::new(&source);
        assert_eq!(br.get_bits(64).unwrap(), 0x1234_5678_9abc_def0);
        assert_eq!(br.get_bits(0).unwrap(), 0);
    }

    #[test]
    fn running_out_of_bits() {
        let mut br = BitReader::new(&[0xff]);
        assert_eq!(br.get_bits(7).unwrap(), 0x7f);
        assert_eq!(
            br.get_bits(2),
            Err(GetBitsError::NotEnoughRemainingBits {
                requested: 2,
                remaining: 1
            })
        );
        assert!(br.get_bit().unwrap());
        assert!(br.get_bit().is_err());
    }

    #[test]
    fn too_many_bits() {
        let mut br = BitReader::new(&[0; 16]);
        assert_eq!(
            br.get_bits(65),
            Err(GetBitsError::TooManyBits {
                num_requested_bits: 65,
                limit: 64
            })
        );
    }

    #[test]
    fn skip_and_count() {
        let mut br = BitReader::new(&[0b1110_0101, 0xAA]);
        br.get_bits(3).unwrap();
        assert_eq!(br.bytes_consumed(), 1);
        assert_eq!(br.skip_to_byte(), (0b00101, 5));
        assert_eq!(br.skip_to_byte(), (0, 0));
        assert_eq!(br.bytes_consumed(), 1);
        br.get_bit().unwrap();
        assert_eq!(br.bytes_consumed(), 2);
    }
}
