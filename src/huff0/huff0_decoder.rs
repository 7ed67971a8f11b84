use alloc::vec::Vec;

use super::tree::{HuffmanTree, Node, NodeId};
use crate::decoding::bit_reader::{BitReader, GetBitsError};

/// Where the decoder currently stands in the tree
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DecoderState {
    /// No bits of the next symbol have been consumed yet
    AtRoot,
    /// Some bits of the next symbol have been consumed, we are at this internal node
    Descending(NodeId),
}

pub struct HuffmanDecoder<'table> {
    tree: &'table HuffmanTree,
    state: DecoderState,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum HuffmanDecoderError {
    #[error(transparent)]
    GetBitsError(#[from] GetBitsError),
    #[error("Tried to descend below a leaf. The tree does not match the bitstream")]
    DescendedPastLeaf,
}

impl<'t> HuffmanDecoder<'t> {
    pub fn new(tree: &'t HuffmanTree) -> HuffmanDecoder<'t> {
        HuffmanDecoder {
            tree,
            state: DecoderState::AtRoot,
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Feed one bit. Returns the symbol if this bit completed one, in which case the
    /// decoder is back at the root.
    pub fn step(&mut self, bit: bool) -> Result<Option<u8>, HuffmanDecoderError> {
        let current = match self.state {
            DecoderState::AtRoot => self.tree.root(),
            DecoderState::Descending(id) => id,
        };
        let next = self
            .tree
            .child(current, bit)
            .ok_or(HuffmanDecoderError::DescendedPastLeaf)?;

        match self.tree.node(next) {
            Node::Leaf { symbol, .. } => {
                self.state = DecoderState::AtRoot;
                Ok(Some(*symbol))
            }
            Node::Internal { .. } => {
                self.state = DecoderState::Descending(next);
                Ok(None)
            }
        }
    }

    /// Consume bits until one symbol is complete
    pub fn decode_symbol(&mut self, br: &mut BitReader<'_>) -> Result<u8, HuffmanDecoderError> {
        loop {
            if let Some(symbol) = self.step(br.get_bit()?)? {
                return Ok(symbol);
            }
        }
    }

    /// Decode exactly `count` symbols into `target`. Bits after the last symbol are not touched.
    pub fn decode_all(
        &mut self,
        br: &mut BitReader<'_>,
        count: usize,
        target: &mut Vec<u8>,
    ) -> Result<(), HuffmanDecoderError> {
        target.reserve(count);
        for _ in 0..count {
            let symbol = self.decode_symbol(br)?;
            target.push(symbol);
        }
        Ok(())
    }
}
