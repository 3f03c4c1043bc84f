//! Keyed hash primitive
//!
//! The search only needs a deterministic keyed hash with a streaming
//! interface: derive a context from a key, feed bytes, finalize to a 32-bit
//! digest. `KeyedHash` is that seam; `Blake2sKeyed` is the production
//! implementation (BLAKE2s, 4-byte digest, nonce as key).

use blake2::Blake2sMac;
use blake2::digest::consts::U4;
use blake2::digest::{KeyInit, Mac};

use crate::params::{HASH_BYTES, HashValue, NONCE_BYTES};

/// BLAKE2s rejects keys longer than 32 bytes
const BLAKE2S_KEYBYTES: usize = 32;

const _: () = assert!(NONCE_BYTES <= BLAKE2S_KEYBYTES);
const _: () = assert!(HASH_BYTES == core::mem::size_of::<HashValue>());

/// A keyed hash with a cloneable streaming state
///
/// `keyed` is called once per nonce; the resulting state is cloned for every
/// corpus string, so cloning must be cheap compared to re-keying.
pub trait KeyedHash: Sync {
    /// Streaming state after keying
    type State: Clone;

    /// Derive a fresh context from key material
    fn keyed(&self, key: &[u8; NONCE_BYTES]) -> Self::State;

    /// Absorb data into the context
    fn update(&self, state: &mut Self::State, data: &[u8]);

    /// Finish the context and read the digest as a little-endian integer
    fn finalize(&self, state: Self::State) -> HashValue;

    /// Hash a single message under an already keyed prototype state
    #[inline]
    fn digest(&self, proto: &Self::State, data: &[u8]) -> HashValue {
        let mut state = proto.clone();
        self.update(&mut state, data);
        self.finalize(state)
    }
}

/// BLAKE2s in keyed mode with a 4-byte digest
///
/// Equivalent to `blake2s(key=nonce.to_le_bytes(), digest_size=4)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake2sKeyed;

impl KeyedHash for Blake2sKeyed {
    type State = Blake2sMac<U4>;

    #[inline]
    fn keyed(&self, key: &[u8; NONCE_BYTES]) -> Self::State {
        <Blake2sMac<U4> as KeyInit>::new_from_slice(key)
            .expect("nonce key length is within the BLAKE2s key limit")
    }

    #[inline]
    fn update(&self, state: &mut Self::State, data: &[u8]) {
        Mac::update(state, data);
    }

    #[inline]
    fn finalize(&self, state: Self::State) -> HashValue {
        let digest = state.finalize().into_bytes();
        let mut bytes = [0u8; HASH_BYTES];
        bytes.copy_from_slice(&digest);
        HashValue::from_le_bytes(bytes)
    }
}

/// Fold the two 16-bit halves of a digest into a check value
///
/// Used by the precomputed table to reject strings that land on an occupied
/// slot without being the stored entry.
#[inline(always)]
pub fn half_hash(hash: HashValue) -> u16 {
    ((hash & 0xFFFF) ^ (hash >> 16)) as u16
}
