use super::code_table::{CodeTable, CodeTableError};
use super::{FrequencyTable, HuffmanTree};
use crate::encoding::bit_writer::BitWriter;

/// Owns the tree and code table built for one input buffer and packs that buffer
/// into a bitstream.
pub struct HuffmanEncoder {
    tree: HuffmanTree,
    table: CodeTable,
}

impl HuffmanEncoder {
    pub fn new(tree: HuffmanTree) -> Result<Self, CodeTableError> {
        let table = CodeTable::from_tree(&tree)?;
        Ok(HuffmanEncoder { tree, table })
    }

    /// Count `data` and build the encoder for it. `Ok(None)` if `data` is empty.
    pub fn for_data(data: &[u8]) -> Result<Option<Self>, CodeTableError> {
        let frequencies = FrequencyTable::from_bytes(data);
        HuffmanTree::from_frequencies(&frequencies)
            .map(HuffmanEncoder::new)
            .transpose()
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    pub fn table(&self) -> &CodeTable {
        &self.table
    }

    /// Give up the code table and keep the tree, which is what goes into the container header
    pub fn into_tree(self) -> HuffmanTree {
        self.tree
    }

    /// Append the code of every byte of `data` to `writer`, returning the number of bits written.
    ///
    /// The writer is not padded, the caller decides where the stream ends.
    pub(crate) fn encode(&self, data: &[u8], writer: &mut BitWriter) -> Result<u64, CodeTableError> {
        let start = writer.bits_written();
        for symbol in data {
            let code = self
                .table
                .code(*symbol)
                .ok_or(CodeTableError::MissingSymbol { symbol: *symbol })?;
            writer.write_code(code.bits, code.len);
        }
        Ok(writer.bits_written() - start)
    }
}

#[cfg(test)]
mod tests {
    use super::HuffmanEncoder;
    use crate::encoding::bit_writer::BitWriter;
    use crate::huff0::CodeTableError;
    use alloc::vec;

    #[test]
    fn packs_codes_msb_first() {
        let encoder = HuffmanEncoder::for_data(b"aaaabbbccd").unwrap().unwrap();
        let mut writer = BitWriter::new();
        // a=0 b=10 c=111 d=110
        let bits = encoder.encode(b"abcd", &mut writer).unwrap();
        assert_eq!(bits, 1 + 2 + 3 + 3);
        // 0 10 111 110 -> 0101_1111 0(000_0000)
        assert_eq!(writer.dump(), vec![0b0101_1111, 0b0000_0000]);
    }

    #[test]
    fn empty_data_has_no_encoder() {
        assert!(HuffmanEncoder::for_data(&[]).unwrap().is_none());
    }

    #[test]
    fn unknown_symbol_is_an_error() {
        let encoder = HuffmanEncoder::for_data(b"ab").unwrap().unwrap();
        let mut writer = BitWriter::new();
        assert_eq!(
            encoder.encode(b"abc", &mut writer),
            Err(CodeTableError::MissingSymbol { symbol: b'c' })
        );
    }
}
