//! # spanpow core algorithm
//!
//! A proof-of-work style search over 32-bit nonces. For each nonce, a fixed
//! corpus of strings is hashed with BLAKE2s keyed by the nonce. A nonce
//! qualifies when no two digests collide and at least one reducer in a fixed
//! bank maps the digests to distinct bytes. The search returns the nonce
//! whose best reducer packs those bytes most tightly.
//!
//! ## Terms
//!
//! - **Span**: `max - min` of a collision-free set of values
//! - **Reducer**: a byte-valued function of a 32-bit digest
//! - **Reduced span**: span of the reducer outputs over the corpus digests
//!
//! ## Ordering
//!
//! Results compare on `(reduced_span, span)`, smaller first. The same
//! comparator is used inside each worker and across workers, so a
//! partitioned search returns exactly what a single-threaded scan of the
//! same range returns: the earliest nonce among the minimal results.
//!
//! ## Example
//!
//! ```rust
//! use spanpow_core::{
//!     Blake2sKeyed, CancelToken, ReducerBank, SearchRange, StringCorpus, search,
//! };
//!
//! let corpus = StringCorpus::new(["alpha", "beta", "gamma"]).unwrap();
//! let bank = ReducerBank::standard();
//! let range = SearchRange::new(0, 64).unwrap();
//!
//! let best = search(&Blake2sKeyed, &corpus, &bank, range, 2, &CancelToken::new()).unwrap();
//! if let Some(result) = best {
//!     println!("nonce {:#x} reducer {}", result.nonce, result.reducer);
//! }
//! ```

mod corpus;
mod error;
mod evaluator;
mod params;
mod primitives;
mod reducers;
mod search;
mod table;

pub use corpus::StringCorpus;
pub use error::SearchError;
pub use evaluator::{EvaluationResult, NonceEvaluator, Scratch};
pub use params::*;
pub use primitives::{Blake2sKeyed, KeyedHash, half_hash};
pub use reducers::{Reducer, ReducerBank, ReducerFn, STANDARD, split_bytes};
pub use search::{
    CancelToken, SearchCoordinator, SearchRange, aggregate, nonce_search_loop, search,
};
pub use table::{PrecomputedTable, RowDisplacement, TableEntry};
