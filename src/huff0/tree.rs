use alloc::collections::BinaryHeap;
use alloc::vec::Vec;
use core::cmp::Reverse;

use super::FrequencyTable;
use crate::common::MAX_SYMBOLS;
use crate::decoding::bit_reader::{BitReader, GetBitsError};
use crate::encoding::bit_writer::BitWriter;

/// Index of a node inside the arena of a [HuffmanTree]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    Internal {
        /// Followed when the next bit is 0
        zero: NodeId,
        /// Followed when the next bit is 1
        one: NodeId,
        weight: u64,
    },
}

impl Node {
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

/// A binary prefix code tree over byte values.
///
/// Nodes live in an arena owned by the tree and refer to their children by [NodeId].
/// Children are always pushed before their parent, so the arena can never describe
/// a cycle. A tree always has an internal root and at least two leaves, even when
/// it was built from a single distinct symbol.
///
/// Trees are immutable once built. Trees read back from a container carry the shape
/// only, all their weights are zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: NodeId,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReadTreeError {
    #[error(transparent)]
    GetBitsError(#[from] GetBitsError),
    #[error("Tree describes more than {} internal nodes", MAX_SYMBOLS - 1)]
    TooManyInternalNodes,
    #[error("Symbol {symbol} appears in more than one leaf")]
    DuplicateSymbol { symbol: u8 },
    #[error("The root of the tree must not be a leaf")]
    RootIsLeaf,
    #[error("Padding after the tree must be zero but is: {got:#b}")]
    NonZeroPadding { got: u8 },
}

impl HuffmanTree {
    /// Build the tree for the given frequencies. Returns `None` for an empty table,
    /// there is nothing to build a tree from.
    ///
    /// Construction is deterministic: leaves are created in ascending symbol order,
    /// every node gets the next free arena slot, and the min-heap orders by
    /// `(weight, arena index)`. The first node taken from the heap becomes the
    /// zero-branch of the merged node, the second one the one-branch.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Option<HuffmanTree> {
        let mut nodes = Vec::with_capacity(frequencies.distinct_symbols() * 2);
        for (symbol, weight) in frequencies.iter() {
            nodes.push(Node::Leaf { symbol, weight });
        }

        match nodes.len() {
            0 => return None,
            1 => {
                let (symbol, weight) = frequencies.iter().next()?;
                return Some(Self::single_symbol(symbol, weight));
            }
            _ => {}
        }

        let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| Reverse((node.weight(), NodeId(idx))))
            .collect();

        while heap.len() > 1 {
            let Reverse((zero_weight, zero)) = heap.pop()?;
            let Reverse((one_weight, one)) = heap.pop()?;
            let weight = zero_weight + one_weight;
            let id = NodeId(nodes.len());
            nodes.push(Node::Internal { zero, one, weight });
            heap.push(Reverse((weight, id)));
        }

        let Reverse((_, root)) = heap.pop()?;
        let tree = HuffmanTree { nodes, root };
        tracing::trace!(
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            "built huffman tree"
        );
        Some(tree)
    }

    /// A lone symbol still needs a one bit code, so it gets a synthetic sibling
    /// of weight zero that is never emitted.
    fn single_symbol(symbol: u8, weight: u64) -> HuffmanTree {
        let nodes = alloc::vec![
            Node::Leaf { symbol, weight },
            Node::Leaf {
                symbol: symbol ^ 1,
                weight: 0,
            },
            Node::Internal {
                zero: NodeId(0),
                one: NodeId(1),
                weight,
            },
        ];
        HuffmanTree {
            nodes,
            root: NodeId(2),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// The node reached from `id` by following `bit`, or `None` if `id` is a leaf.
    pub fn child(&self, id: NodeId, bit: bool) -> Option<NodeId> {
        match self.node(id) {
            Node::Leaf { .. } => None,
            Node::Internal { zero, one, .. } => Some(if bit { *one } else { *zero }),
        }
    }

    /// Summed weight of all leaves, the length of the input for built trees
    pub fn weight(&self) -> u64 {
        self.node(self.root).weight()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Length of the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        self.leaves().map(|(_, depth)| depth).max().unwrap_or(0)
    }

    /// Iterate over `(symbol, depth)` of all leaves, zero-branches before one-branches.
    pub fn leaves(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        let mut stack = alloc::vec![(self.root, 0usize)];
        core::iter::from_fn(move || {
            while let Some((id, depth)) = stack.pop() {
                match self.node(id) {
                    Node::Leaf { symbol, .. } => return Some((*symbol, depth)),
                    Node::Internal { zero, one, .. } => {
                        stack.push((*one, depth + 1));
                        stack.push((*zero, depth + 1));
                    }
                }
            }
            None
        })
    }

    /// Serialize the shape of the tree depth first: `0` for an internal node followed by
    /// its zero-branch then its one-branch, `1` followed by the 8 bit symbol for a leaf.
    pub(crate) fn write_shape(&self, writer: &mut BitWriter) {
        let mut stack = alloc::vec![self.root];
        while let Some(id) = stack.pop() {
            match self.node(id) {
                Node::Leaf { symbol, .. } => {
                    writer.write_bit(true);
                    writer.write_bits(u64::from(*symbol), 8);
                }
                Node::Internal { zero, one, .. } => {
                    writer.write_bit(false);
                    stack.push(*one);
                    stack.push(*zero);
                }
            }
        }
    }

    /// Read a tree written by [HuffmanTree::write_shape] and skip the padding up to the next byte boundary.
    pub(crate) fn read_shape(br: &mut BitReader<'_>) -> Result<HuffmanTree, ReadTreeError> {
        let mut reader = ShapeReader {
            nodes: Vec::new(),
            seen: [false; MAX_SYMBOLS],
            internals: 0,
        };
        let root = reader.read_node(br)?;
        if reader.nodes[root.0].is_leaf() {
            return Err(ReadTreeError::RootIsLeaf);
        }

        let (padding, _) = br.skip_to_byte();
        if padding != 0 {
            return Err(ReadTreeError::NonZeroPadding { got: padding });
        }

        Ok(HuffmanTree {
            nodes: reader.nodes,
            root,
        })
    }
}

struct ShapeReader {
    nodes: Vec<Node>,
    seen: [bool; MAX_SYMBOLS],
    internals: usize,
}

impl ShapeReader {
    // Recursion depth is bounded by the internal node limit
    fn read_node(&mut self, br: &mut BitReader<'_>) -> Result<NodeId, ReadTreeError> {
        if br.get_bit()? {
            let symbol = br.get_bits(8)? as u8;
            if self.seen[symbol as usize] {
                return Err(ReadTreeError::DuplicateSymbol { symbol });
            }
            self.seen[symbol as usize] = true;
            Ok(self.push(Node::Leaf { symbol, weight: 0 }))
        } else {
            self.internals += 1;
            if self.internals >= MAX_SYMBOLS {
                return Err(ReadTreeError::TooManyInternalNodes);
            }
            let zero = self.read_node(br)?;
            let one = self.read_node(br)?;
            Ok(self.push(Node::Internal {
                zero,
                one,
                weight: 0,
            }))
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}
