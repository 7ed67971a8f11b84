use core::fmt;

use super::tree::{HuffmanTree, Node, NodeId};
use super::FrequencyTable;
use crate::common::{MAX_CODE_LEN, MAX_SYMBOLS};

/// A single prefix code: the low `len` bits of `bits`, first bit most significant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Code {
    pub bits: u128,
    pub len: u8,
}

impl Code {
    /// The code one level further down the tree
    fn push(self, bit: bool) -> Code {
        Code {
            bits: (self.bits << 1) | u128::from(bit),
            len: self.len + 1,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for idx in (0..self.len).rev() {
            let bit = (self.bits >> idx) & 1;
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodeTableError {
    #[error("Tree is deeper than the maximum code length of {limit} bits")]
    TreeTooDeep { limit: u8 },
    #[error("Symbol {symbol} has no code in this table")]
    MissingSymbol { symbol: u8 },
}

/// Maps every leaf symbol of a tree to its code.
#[derive(Clone, PartialEq, Eq)]
pub struct CodeTable {
    /// Index is the symbol, absent symbols have a code of length 0
    codes: [Code; MAX_SYMBOLS],
}

impl CodeTable {
    /// Walk the tree depth first, appending `0` when taking the zero-branch and
    /// `1` when taking the one-branch. A code is final once a leaf is reached.
    pub fn from_tree(tree: &HuffmanTree) -> Result<CodeTable, CodeTableError> {
        let mut table = CodeTable {
            codes: [Code::default(); MAX_SYMBOLS],
        };
        table.assign(tree, tree.root(), Code::default())?;
        Ok(table)
    }

    fn assign(&mut self, tree: &HuffmanTree, id: NodeId, code: Code) -> Result<(), CodeTableError> {
        match tree.node(id) {
            Node::Leaf { symbol, .. } => {
                debug_assert!(code.len > 0, "trees always have an internal root");
                self.codes[*symbol as usize] = code;
                Ok(())
            }
            Node::Internal { zero, one, .. } => {
                if code.len == MAX_CODE_LEN {
                    return Err(CodeTableError::TreeTooDeep {
                        limit: MAX_CODE_LEN,
                    });
                }
                self.assign(tree, *zero, code.push(false))?;
                self.assign(tree, *one, code.push(true))
            }
        }
    }

    pub fn code(&self, symbol: u8) -> Option<Code> {
        let code = self.codes[symbol as usize];
        (code.len > 0).then_some(code)
    }

    /// Code length of `symbol`, 0 if it has no code
    pub fn len(&self, symbol: u8) -> u8 {
        self.codes[symbol as usize].len
    }

    /// Number of symbols with a code
    pub fn symbols(&self) -> usize {
        self.iter().count()
    }

    /// Iterate over `(symbol, code)` in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter(|(_, code)| code.len > 0)
            .map(|(symbol, code)| (symbol as u8, *code))
    }

    /// Number of payload bits needed to encode the data the frequencies were counted from
    pub fn encoded_bit_len(&self, frequencies: &FrequencyTable) -> Result<u64, CodeTableError> {
        let mut bits = 0;
        for (symbol, count) in frequencies.iter() {
            let len = self.len(symbol);
            if len == 0 {
                return Err(CodeTableError::MissingSymbol { symbol });
            }
            bits += u64::from(len) * count;
        }
        Ok(bits)
    }

    /// Check that no code is a prefix of another one.
    pub fn is_prefix_free(&self) -> bool {
        let codes: alloc::vec::Vec<Code> = self.iter().map(|(_, code)| code).collect();
        codes.iter().enumerate().all(|(idx, a)| {
            codes.iter().enumerate().all(|(other, b)| {
                if idx == other || a.len > b.len {
                    return true;
                }
                (b.bits >> (b.len - a.len)) != a.bits
            })
        })
    }
}

impl fmt::Debug for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (symbol, code) in self.iter() {
            map.entry(&symbol, &format_args!("{code}"));
        }
        map.finish()
    }
}
