//! Per-nonce evaluation
//!
//! For one nonce the evaluator hashes every corpus string under the
//! nonce-keyed hash, rejects the nonce if any two digests collide, and then
//! runs every reducer of the bank over the digests. The reducer giving the
//! smallest collision-free reduced span wins; ties keep the lower index.
//!
//! ```text
//! nonce ──keyed──▶ proto state ──clone+update+finalize──▶ digests (sorted)
//!                                                          │
//!                       span = max - min  ◀── complete? ───┘
//!                                                          │
//!              for each reducer: reduce, sort, complete? ──▶ reduced span
//! ```

use crate::corpus::StringCorpus;
use crate::params::{
    HashValue, Nonce, REDUCED_SPAN_SENTINEL, REDUCER_SENTINEL, ReducedHash, ReducerIndex,
    SPAN_SENTINEL,
};
use crate::primitives::KeyedHash;
use crate::reducers::ReducerBank;

/// Outcome of evaluating one nonce
///
/// `reduced_span` and `reducer` are only meaningful together. Both stay at
/// their sentinels when no reducer separated the digests; `span` stays at its
/// sentinel when the digests themselves collided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EvaluationResult {
    pub nonce: Nonce,
    pub span: HashValue,
    pub reduced_span: ReducedHash,
    pub reducer: ReducerIndex,
}

impl EvaluationResult {
    /// All-sentinel result for `nonce`
    pub const fn sentinel(nonce: Nonce) -> Self {
        Self {
            nonce,
            span: SPAN_SENTINEL,
            reduced_span: REDUCED_SPAN_SENTINEL,
            reducer: REDUCER_SENTINEL,
        }
    }

    /// Whether some reducer produced a collision-free reduced set
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.reduced_span != REDUCED_SPAN_SENTINEL
    }

    /// Index of the winning reducer, if any
    pub fn reducer_index(&self) -> Option<usize> {
        if self.is_valid() {
            Some(self.reducer as usize)
        } else {
            None
        }
    }

    /// Two-level ordering used by every reduction over results
    ///
    /// Smaller `reduced_span` wins; on equal `reduced_span` smaller `span`
    /// wins. Full ties are not "better", so a fold keeps the first-seen
    /// result.
    #[inline]
    pub fn is_better_than(&self, other: &Self) -> bool {
        self.reduced_span < other.reduced_span
            || (self.reduced_span == other.reduced_span && self.span < other.span)
    }
}

impl Default for EvaluationResult {
    fn default() -> Self {
        Self::sentinel(Nonce::MAX)
    }
}

/// Reusable buffers sized to the corpus
///
/// Allocated once per worker and cleared for every nonce.
#[derive(Debug, Default)]
pub struct Scratch {
    hashes: Vec<HashValue>,
    reduced: Vec<ReducedHash>,
}

impl Scratch {
    pub fn with_capacity(corpus_len: usize) -> Self {
        Self {
            hashes: Vec::with_capacity(corpus_len),
            reduced: Vec::with_capacity(corpus_len),
        }
    }

    /// Sorted digests of the last evaluated nonce
    pub fn hashes(&self) -> &[HashValue] {
        &self.hashes
    }
}

/// First and last element of a sorted slice, if no two neighbours are equal
#[inline]
fn complete_bounds<T: Copy + PartialEq>(sorted: &[T]) -> Option<(T, T)> {
    if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
        return None;
    }
    Some((*sorted.first()?, *sorted.last()?))
}

/// Evaluates nonces against a fixed corpus and reducer bank
pub struct NonceEvaluator<'a, H: KeyedHash> {
    hasher: &'a H,
    corpus: &'a StringCorpus,
    bank: &'a ReducerBank,
}

impl<'a, H: KeyedHash> NonceEvaluator<'a, H> {
    pub fn new(hasher: &'a H, corpus: &'a StringCorpus, bank: &'a ReducerBank) -> Self {
        Self {
            hasher,
            corpus,
            bank,
        }
    }

    pub fn corpus(&self) -> &'a StringCorpus {
        self.corpus
    }

    pub fn bank(&self) -> &'a ReducerBank {
        self.bank
    }

    pub fn hasher(&self) -> &'a H {
        self.hasher
    }

    /// Buffers sized for this evaluator's corpus
    pub fn scratch(&self) -> Scratch {
        Scratch::with_capacity(self.corpus.len())
    }

    /// Evaluate one nonce with freshly allocated buffers
    pub fn evaluate(&self, nonce: Nonce) -> EvaluationResult {
        let mut scratch = self.scratch();
        self.evaluate_with(nonce, &mut scratch)
    }

    /// Evaluate one nonce reusing `scratch`
    pub fn evaluate_with(&self, nonce: Nonce, scratch: &mut Scratch) -> EvaluationResult {
        let Scratch { hashes, reduced } = scratch;
        let mut result = EvaluationResult::sentinel(nonce);

        let proto = self.hasher.keyed(&nonce.to_le_bytes());
        hashes.clear();
        hashes.extend(self.corpus.iter().map(|s| self.hasher.digest(&proto, s)));
        hashes.sort_unstable();

        let Some((lowest, highest)) = complete_bounds(hashes.as_slice()) else {
            return result;
        };
        result.span = highest - lowest;

        for (index, reducer) in self.bank.iter().enumerate() {
            reduced.clear();
            reduced.extend(hashes.iter().map(|&h| reducer.apply(h)));
            reduced.sort_unstable();

            let Some((lowest, highest)) = complete_bounds(reduced.as_slice()) else {
                continue;
            };
            let candidate = highest - lowest;
            // Strict: equal spans keep the earlier reducer
            if candidate < result.reduced_span {
                result.reduced_span = candidate;
                result.reducer = index as ReducerIndex;
            }
        }

        result
    }
}
