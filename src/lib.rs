//! spanpow Library
//!
//! Finds a 32-bit nonce under which a fixed set of strings hashes, through
//! BLAKE2s keyed by the nonce and one of a bank of byte reducers, to distinct
//! bytes packed as tightly as possible. The winning `(nonce, reducer)` pair
//! indexes a compact perfect hash table over the strings.
//!
//! # Example
//!
//! ```rust
//! use spanpow::algorithm::{Blake2sKeyed, CancelToken, ReducerBank, SearchRange};
//! use spanpow::corpus;
//! use spanpow::report::SearchReport;
//!
//! let corpus = corpus::parse_lines("GET\nPUT\nPOST\nHEAD\n").unwrap();
//! let bank = ReducerBank::standard();
//! let range = SearchRange::new(0x9000_0000, 0x9000_0100).unwrap();
//!
//! let best = spanpow::search(&Blake2sKeyed, &corpus, &bank, range, 2, &CancelToken::new())
//!     .unwrap();
//! if let Some(report) = best.and_then(SearchReport::from_result) {
//!     println!("{}", report.to_text());
//! }
//! ```

// Re-export the core algorithm
pub use spanpow_core as algorithm;

pub mod corpus;
pub mod report;

// Convenience re-exports
pub use algorithm::{
    search, Blake2sKeyed, CancelToken, EvaluationResult, PrecomputedTable, ReducerBank,
    SearchError, SearchRange, StringCorpus,
};
pub use corpus::CorpusError;
pub use report::{SearchReport, TableReport};
