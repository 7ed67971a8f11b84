//! Huffman coding is a method of encoding where symbols are assigned a code,
//! and more commonly used symbols get shorter codes, and less commonly
//! used symbols get longer codes. Codes are prefix free, meaning no two codes
//! will start with the same sequence of bits.
//!
//! This module builds one static tree per buffer: [FrequencyTable] counts the bytes,
//! [HuffmanTree] merges them into a tree, [CodeTable] reads the codes off the tree,
//! and [HuffmanEncoder] / [HuffmanDecoder] move between bytes and bits.
mod code_table;
mod frequency;
mod huff0_decoder;
mod huff0_encoder;
mod tree;

pub use code_table::*;
pub use frequency::*;
pub use huff0_decoder::*;
pub use huff0_encoder::*;
pub use tree::*;

/// Encode `data` with a tree built for it and decode it again with the same tree,
/// panicking if the result differs from the input.
#[cfg(any(test, feature = "fuzz_exports"))]
pub fn round_trip(data: &[u8]) {
    use crate::decoding::bit_reader::BitReader;
    use crate::encoding::bit_writer::BitWriter;
    use alloc::vec::Vec;

    let Some(encoder) = HuffmanEncoder::for_data(data).unwrap() else {
        assert!(data.is_empty());
        return;
    };
    let mut writer = BitWriter::new();
    let bits = encoder.encode(data, &mut writer).unwrap();
    assert_eq!(
        Ok(bits),
        encoder
            .table()
            .encoded_bit_len(&FrequencyTable::from_bytes(data))
    );
    let encoded = writer.dump();

    let mut br = BitReader::new(&encoded);
    let mut decoder = HuffmanDecoder::new(encoder.tree());
    let mut decoded = Vec::new();
    decoder.decode_all(&mut br, data.len(), &mut decoded).unwrap();
    assert_eq!(decoded, data);
    assert_eq!(br.bytes_consumed(), encoded.len());
}

#[test]
fn round_trips() {
    round_trip(&[]);
    round_trip(&[1]);
    round_trip(&[0xff; 77]);
    round_trip(b"aaaabbbccd");
    round_trip(b"abracadabra");
    let everything: alloc::vec::Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    round_trip(&everything);
}
