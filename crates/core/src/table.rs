//! Precomputed lookup table for a solved `(nonce, reducer)` pair
//!
//! Once a nonce separates the corpus under some reducer, every corpus
//! string owns a distinct reduced byte. Those bytes are shifted by their
//! minimum and then packed with a row-displacement perfect hash: key `i` is
//! placed in a `t`-wide square at `(i % t, i / t)`, and each row is slid by
//! `r[row]` until its keys land on free columns of a single shared row. The
//! slot of `i` is `i % t + r[i / t]`.
//!
//! Each slot stores a 16-bit check value so that strings outside the corpus
//! that land on an occupied slot are rejected.

use core::fmt;

use crate::corpus::StringCorpus;
use crate::error::SearchError;
use crate::params::{HashValue, Nonce, ReducedHash};
use crate::primitives::{KeyedHash, half_hash};
use crate::reducers::{Reducer, ReducerBank};

/// Row-displacement layout for a set of distinct small keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDisplacement {
    width: usize,
    displacement: Vec<usize>,
    len: usize,
}

impl RowDisplacement {
    /// Pack `keys` (distinct) into as few slots as first-fit allows
    ///
    /// Rows are placed longest first, ties in row order; each row takes the
    /// smallest displacement at which none of its columns is taken.
    pub fn build(keys: &[usize]) -> Self {
        let max = keys.iter().copied().max().unwrap_or(0);
        let mut width = max.isqrt() + 1;
        if width * width < keys.len() {
            width = keys.len();
        }

        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); width];
        for &key in keys {
            rows[key / width].push(key % width);
        }
        for row in rows.iter_mut() {
            row.sort_unstable();
        }

        let mut order: Vec<usize> = (0..width).filter(|&y| !rows[y].is_empty()).collect();
        order.sort_by_key(|&y| (usize::MAX - rows[y].len(), y));

        let mut displacement = vec![0; width];
        let mut taken: Vec<bool> = Vec::new();
        for y in order {
            let row = &rows[y];
            let shift = (0..)
                .find(|&d| row.iter().all(|&x| !taken.get(x + d).copied().unwrap_or(false)))
                .unwrap_or(0);

            for &x in row {
                let slot = x + shift;
                if slot >= taken.len() {
                    taken.resize(slot + 1, false);
                }
                taken[slot] = true;
            }
            displacement[y] = shift;
        }

        Self {
            width,
            displacement,
            len: taken.len().max(1),
        }
    }

    /// Row width `t`
    pub fn width(&self) -> usize {
        self.width
    }

    /// Per-row displacement `r`
    pub fn displacement(&self) -> &[usize] {
        &self.displacement
    }

    /// Number of slots in the packed row
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slot for `key`, or `None` if its row lies outside the square
    #[inline]
    pub fn remap(&self, key: usize) -> Option<usize> {
        let shift = self.displacement.get(key / self.width)?;
        Some(key % self.width + shift)
    }
}

/// Hashing details of one corpus string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEntry {
    /// Position of the string in the corpus
    pub index: usize,
    /// Full 32-bit digest
    pub hash: HashValue,
    /// Check value stored in the slot
    pub half: u16,
    /// Reducer output
    pub reduced: ReducedHash,
    /// `reduced - offset`
    pub shifted: usize,
    /// Packed slot of `shifted`
    pub slot: usize,
}

/// Perfect hash table over the reduced digests of a corpus
///
/// Every corpus string maps to a value of type `V`; `build` uses the corpus
/// index itself.
pub struct PrecomputedTable<'a, H: KeyedHash, V = usize> {
    hasher: &'a H,
    reducer: &'a Reducer,
    nonce: Nonce,
    reducer_index: usize,
    proto: H::State,
    offset: ReducedHash,
    reduced_span: ReducedHash,
    layout: RowDisplacement,
    entries: Vec<TableEntry>,
    slots: Vec<Option<(u16, usize)>>,
    values: Vec<V>,
}

impl<'a, H: KeyedHash> PrecomputedTable<'a, H, usize> {
    /// Build the table for `corpus` under `nonce` and the reducer at
    /// `reducer_index`, mapping each string to its corpus index
    ///
    /// Fails if the index is outside the bank or the reducer maps two corpus
    /// strings to the same byte.
    pub fn build(
        hasher: &'a H,
        corpus: &StringCorpus,
        bank: &'a ReducerBank,
        nonce: Nonce,
        reducer_index: usize,
    ) -> Result<Self, SearchError> {
        Self::build_with_values(hasher, corpus, bank, nonce, reducer_index, 0..corpus.len())
    }
}

impl<'a, H: KeyedHash, V> PrecomputedTable<'a, H, V> {
    /// Build the table mapping the i-th corpus string to the i-th value
    pub fn build_with_values<I>(
        hasher: &'a H,
        corpus: &StringCorpus,
        bank: &'a ReducerBank,
        nonce: Nonce,
        reducer_index: usize,
        values: I,
    ) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = V>,
    {
        let reducer = bank.get(reducer_index).ok_or(SearchError::UnknownReducer {
            index: reducer_index,
            len: bank.len(),
        })?;
        let values: Vec<V> = values.into_iter().collect();
        if values.len() != corpus.len() {
            return Err(SearchError::ValueCountMismatch {
                values: values.len(),
                strings: corpus.len(),
            });
        }

        let proto = hasher.keyed(&nonce.to_le_bytes());
        let mut entries: Vec<TableEntry> = corpus
            .iter()
            .enumerate()
            .map(|(index, s)| {
                let hash = hasher.digest(&proto, s);
                TableEntry {
                    index,
                    hash,
                    half: half_hash(hash),
                    reduced: reducer.apply(hash),
                    shifted: 0,
                    slot: 0,
                }
            })
            .collect();

        let offset = entries
            .iter()
            .map(|e| e.reduced)
            .min()
            .ok_or(SearchError::EmptyCorpus)?;
        let highest = entries.iter().map(|e| e.reduced).max().unwrap_or(offset);

        let mut seen = [false; 256];
        for entry in entries.iter_mut() {
            if std::mem::replace(&mut seen[entry.reduced as usize], true) {
                return Err(SearchError::IncompleteReducer {
                    nonce,
                    reducer: reducer_index,
                });
            }
            entry.shifted = (entry.reduced - offset) as usize;
        }

        let keys: Vec<usize> = entries.iter().map(|e| e.shifted).collect();
        let layout = RowDisplacement::build(&keys);

        let mut slots = vec![None; layout.len()];
        for entry in entries.iter_mut() {
            // Every key lies inside the square the layout was built for
            entry.slot = layout.remap(entry.shifted).unwrap_or_default();
            slots[entry.slot] = Some((entry.half, entry.index));
        }

        Ok(Self {
            hasher,
            reducer,
            nonce,
            reducer_index,
            proto,
            offset,
            reduced_span: highest - offset,
            layout,
            entries,
            slots,
            values,
        })
    }

    pub fn nonce(&self) -> Nonce {
        self.nonce
    }

    pub fn reducer_index(&self) -> usize {
        self.reducer_index
    }

    pub fn reducer(&self) -> &'a Reducer {
        self.reducer
    }

    /// Smallest reduced byte; subtracted before remapping
    pub fn offset(&self) -> ReducedHash {
        self.offset
    }

    /// Largest minus smallest reduced byte
    pub fn reduced_span(&self) -> ReducedHash {
        self.reduced_span
    }

    /// Packing parameters `t` and `r`
    pub fn layout(&self) -> &RowDisplacement {
        &self.layout
    }

    /// Per-string details in corpus order
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// Slot contents: `(check value, corpus index)`
    pub fn slots(&self) -> &[Option<(u16, usize)>] {
        &self.slots
    }

    /// Values in corpus order
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Corpus index of `data`, or `None` if it is not a corpus string
    ///
    /// Strings outside the corpus are rejected unless their digest matches a
    /// stored check value in the same slot; the check is 16 bits wide, so
    /// false positives are possible but rare.
    pub fn lookup_index(&self, data: &[u8]) -> Option<usize> {
        let hash = self.hasher.digest(&self.proto, data);
        let shifted = self.reducer.apply(hash).wrapping_sub(self.offset) as usize;
        let slot = self.layout.remap(shifted)?;
        match self.slots.get(slot)? {
            Some((half, index)) if *half == half_hash(hash) => Some(*index),
            _ => None,
        }
    }

    /// Value stored for `data`
    pub fn lookup(&self, data: &[u8]) -> Option<&V> {
        self.lookup_index(data).map(|index| &self.values[index])
    }
}

impl<H: KeyedHash, V: fmt::Debug> fmt::Debug for PrecomputedTable<'_, H, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrecomputedTable")
            .field("nonce", &self.nonce)
            .field("reducer", &self.reducer)
            .field("reducer_index", &self.reducer_index)
            .field("offset", &self.offset)
            .field("layout", &self.layout)
            .field("entries", &self.entries)
            .field("slots", &self.slots)
            .field("values", &self.values)
            .finish()
    }
}
