//! Configuration and cancellation errors
//!
//! Per-nonce degeneracy (colliding hashes, colliding reductions) is never an
//! error; it is carried by sentinel values in `EvaluationResult`.

use thiserror::Error;

use crate::params::Nonce;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("String corpus is empty")]
    EmptyCorpus,

    #[error("Corpus entry {index} duplicates entry {first}")]
    DuplicateString { index: usize, first: usize },

    #[error("Reducer bank is empty")]
    EmptyReducerBank,

    #[error("Reducer bank has {count} reducers (max {max})")]
    TooManyReducers { count: usize, max: usize },

    #[error("Invalid search range: start {start:#x} is past stop {stop:#x}")]
    InvalidRange { start: u64, stop: u64 },

    #[error("Search range stop {stop:#x} exceeds the 32-bit nonce space")]
    RangeOutOfBounds { stop: u64 },

    #[error("Worker count must be at least 1")]
    ZeroWorkers,

    #[error("Worker count {workers} exceeds the limit of {max}")]
    TooManyWorkers { workers: usize, max: usize },

    #[error("Unknown reducer index {index} (bank has {len})")]
    UnknownReducer { index: usize, len: usize },

    #[error("Reducer {reducer} does not separate the corpus under nonce {nonce:#010x}")]
    IncompleteReducer { nonce: Nonce, reducer: usize },

    #[error("Table needs one value per corpus string ({values} values, {strings} strings)")]
    ValueCountMismatch { values: usize, strings: usize },

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(String),

    #[error("Search cancelled")]
    Cancelled,
}
