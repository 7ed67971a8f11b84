use alloc::vec::Vec;

/// An interface for writing an arbitrary number of bits into a buffer
///
/// Bits are packed most significant bit first: the first bit written lands in bit 7
/// of the first byte. A partially filled last byte is padded with zero bits on the
/// low end, and those padding bits carry no meaning of their own.
pub(crate) struct BitWriter {
    /// The buffer that's filled with bits
    output: Vec<u8>,
    /// The index pointing to the next unoccupied bit. Effectively just
    /// the number of bits that have been written into the buffer so far,
    /// including whatever the buffer held when it was handed over.
    bit_idx: u64,
}

impl BitWriter {
    /// Initialize a new writer. Write new bits into the buffer with `write_bits`, and
    /// obtain the output using `dump`
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    /// Continue writing at the end of an existing buffer. The existing content is
    /// treated as byte aligned and left untouched.
    pub fn from(output: Vec<u8>) -> Self {
        let bit_idx = output.len() as u64 * 8;
        Self { output, bit_idx }
    }

    /// Number of bits in the buffer, counting pre-existing bytes as 8 bits each
    pub fn bits_written(&self) -> u64 {
        self.bit_idx
    }

    /// Write the low `num_bits` of `value`, most significant of those first.
    ///
    /// Bits of `value` above `num_bits` are ignored.
    ///
    /// # Panics
    /// Will panic if `num_bits` is larger than 64.
    pub fn write_bits(&mut self, value: u64, num_bits: u8) {
        assert!(num_bits <= 64, "Cant write more than 64 bits at once: {num_bits}");
        let mut remaining = num_bits;
        while remaining > 0 {
            let used = (self.bit_idx % 8) as u8;
            if used == 0 {
                self.output.push(0);
            }
            // Each iteration only fills up to the next output byte boundary
            let free = 8 - used;
            let take = free.min(remaining);
            let chunk = ((value >> (remaining - take)) & ((1 << take) - 1)) as u8;
            let last = self.output.len() - 1;
            self.output[last] |= chunk << (free - take);

            remaining -= take;
            self.bit_idx += u64::from(take);
        }
    }

    /// Write a code of up to 128 bits, see [BitWriter::write_bits]
    pub fn write_code(&mut self, code: u128, num_bits: u8) {
        assert!(num_bits <= 128, "Cant write more than 128 bits at once: {num_bits}");
        if num_bits > 64 {
            self.write_bits((code >> 64) as u64, num_bits - 64);
            self.write_bits(code as u64, 64);
        } else {
            self.write_bits(code as u64, num_bits);
        }
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(u64::from(bit), 1);
    }

    /// Move the cursor to the next byte boundary. The skipped bits are zero.
    ///
    /// Returns how many padding bits were added.
    pub fn pad_to_byte(&mut self) -> u8 {
        let used = (self.bit_idx % 8) as u8;
        if used == 0 {
            return 0;
        }
        let padding = 8 - used;
        self.bit_idx += u64::from(padding);
        padding
    }

    /// Returns the populated buffer that you've been writing bits into,
    /// with the last byte padded with zeros.
    ///
    /// This function consumes the writer, so it cannot be used after
    /// dumping
    pub fn dump(mut self) -> Vec<u8> {
        self.pad_to_byte();
        debug_assert_eq!(self.output.len() as u64 * 8, self.bit_idx);
        self.output
    }
}
