//! Contains [`FrequencyTable`], the symbol histogram every encode starts from.

use crate::common::MAX_SYMBOLS;

/// Counts how often each of the 256 byte values occurs in a buffer.
///
/// A table is built once per encode call from the whole input and is never
/// updated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; MAX_SYMBOLS],
    distinct: usize,
    total: u64,
}

impl FrequencyTable {
    /// Count every byte of `data`. An empty buffer yields an empty table.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0u64; MAX_SYMBOLS];
        for byte in data {
            counts[*byte as usize] += 1;
        }
        let distinct = counts.iter().filter(|count| **count > 0).count();
        FrequencyTable {
            counts,
            distinct,
            total: data.len() as u64,
        }
    }

    /// How often `symbol` occurred
    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Number of byte values that occurred at least once
    pub fn distinct_symbols(&self) -> usize {
        self.distinct
    }

    /// Sum of all counts, which is the length of the counted buffer
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.distinct == 0
    }

    /// Iterate over `(symbol, count)` for every symbol that occurred, in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(symbol, count)| (symbol as u8, *count))
    }
}

impl core::fmt::Debug for FrequencyTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
