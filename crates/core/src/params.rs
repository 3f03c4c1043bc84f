//! Search Parameters
//!
//! Fixed sizes and sentinel values shared by the evaluator, the search
//! coordinator and the reporters.

/// Candidate value being searched over
pub type Nonce = u32;

/// Digest of one corpus string under a nonce-keyed hash
pub type HashValue = u32;

/// Output of a single reducer
pub type ReducedHash = u8;

/// Position of a reducer in its bank
pub type ReducerIndex = u8;

/// Nonce size in bytes (also the hash key length)
pub const NONCE_BYTES: usize = 4;

/// Digest size in bytes
pub const HASH_BYTES: usize = 4;

/// Size of the nonce space (2^32)
pub const NONCE_SPACE: u64 = 1u64 << 32;

/// Span of an incomplete hash set
pub const SPAN_SENTINEL: HashValue = 0xFFFF_FFFF;

/// Reduced span when no reducer produced a complete set
pub const REDUCED_SPAN_SENTINEL: ReducedHash = 0xFF;

/// Reducer index when no reducer produced a complete set
pub const REDUCER_SENTINEL: ReducerIndex = 0xFF;

/// Largest bank that keeps every index distinct from the sentinel
pub const MAX_REDUCERS: usize = REDUCER_SENTINEL as usize;

/// Number of reducers in the standard bank
pub const STANDARD_REDUCERS: usize = 20;

/// Upper bound on the configured worker count
pub const MAX_WORKERS: usize = 4096;

/// Default search range start
pub const DEFAULT_START: Nonce = 0x9000_0000;

/// Default search range stop (exclusive)
pub const DEFAULT_STOP: u64 = 0x9000_0100;
