//! Reducer bank
//!
//! A reducer compresses a 32-bit digest to one byte. The digest is split
//! into bytes `a, b, c, d`, most-significant first, which are combined with
//! XOR, addition and subtraction under 8-bit wrapping arithmetic.
//!
//! The position of a reducer in its bank is its identity: it is reported as
//! part of a search result and used as the tie-break, so the standard bank's
//! order must never change.

use core::fmt;

use crate::error::SearchError;
use crate::params::{HashValue, MAX_REDUCERS, ReducedHash, STANDARD_REDUCERS};

/// Boxed reducer function
pub type ReducerFn = Box<dyn Fn(HashValue) -> ReducedHash + Send + Sync>;

/// Split a digest into its bytes, most-significant first
#[inline(always)]
pub fn split_bytes(n: HashValue) -> (u8, u8, u8, u8) {
    let [a, b, c, d] = n.to_be_bytes();
    (a, b, c, d)
}

/// The standard reducers in bank order, with their formulas
pub const STANDARD: [(&str, fn(HashValue) -> ReducedHash); STANDARD_REDUCERS] = [
    ("a+b+c+d", f0),
    ("a^b^c^d", f1),
    ("(a^b)+(c^d)", f2),
    ("(a^c)+(b^d)", f3),
    ("(a^d)+(c^b)", f4),
    ("(a+b)^(c+d)", f5),
    ("(a+c)^(b+d)", f6),
    ("(a+d)^(b+c)", f7),
    ("a-b+c-d", f8),
    ("a+b+c-d", f9),
    ("a+b-c-d", f10),
    ("(a^b)-(c^d)", f11),
    ("(a^c)-(b^d)", f12),
    ("(a^d)-(c^b)", f13),
    ("(a+b)^(c-d)", f14),
    ("(a-b)^(c+d)", f15),
    ("(a+c)^(b-d)", f16),
    ("(a-c)^(b+d)", f17),
    ("(a+d)^(b-c)", f18),
    ("(a-d)^(b+c)", f19),
];

fn f0(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    a.wrapping_add(b).wrapping_add(c).wrapping_add(d)
}

fn f1(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    a ^ b ^ c ^ d
}

fn f2(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    (a ^ b).wrapping_add(c ^ d)
}

fn f3(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    (a ^ c).wrapping_add(b ^ d)
}

fn f4(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    (a ^ d).wrapping_add(c ^ b)
}

fn f5(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    a.wrapping_add(b) ^ c.wrapping_add(d)
}

fn f6(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    a.wrapping_add(c) ^ b.wrapping_add(d)
}

fn f7(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    a.wrapping_add(d) ^ b.wrapping_add(c)
}

fn f8(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    a.wrapping_sub(b).wrapping_add(c).wrapping_sub(d)
}

fn f9(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    a.wrapping_add(b).wrapping_add(c).wrapping_sub(d)
}

fn f10(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    a.wrapping_add(b).wrapping_sub(c).wrapping_sub(d)
}

fn f11(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    (a ^ b).wrapping_sub(c ^ d)
}

fn f12(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    (a ^ c).wrapping_sub(b ^ d)
}

fn f13(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    (a ^ d).wrapping_sub(c ^ b)
}

fn f14(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    a.wrapping_add(b) ^ c.wrapping_sub(d)
}

fn f15(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    a.wrapping_sub(b) ^ c.wrapping_add(d)
}

fn f16(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    a.wrapping_add(c) ^ b.wrapping_sub(d)
}

fn f17(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    a.wrapping_sub(c) ^ b.wrapping_add(d)
}

fn f18(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    a.wrapping_add(d) ^ b.wrapping_sub(c)
}

fn f19(n: HashValue) -> ReducedHash {
    let (a, b, c, d) = split_bytes(n);
    a.wrapping_sub(d) ^ b.wrapping_add(c)
}

/// A named reducer
pub struct Reducer {
    name: String,
    func: ReducerFn,
}

impl Reducer {
    /// Wrap a function or closure as a reducer
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(HashValue) -> ReducedHash + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    /// Human-readable formula or label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the reducer
    #[inline(always)]
    pub fn apply(&self, hash: HashValue) -> ReducedHash {
        (self.func)(hash)
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reducer").field("name", &self.name).finish()
    }
}

/// Ordered, immutable collection of reducers
#[derive(Debug)]
pub struct ReducerBank {
    reducers: Vec<Reducer>,
}

impl ReducerBank {
    /// Build a bank from reducers in index order
    ///
    /// Fails when the bank is empty or an index would collide with the
    /// sentinel reducer index.
    pub fn new(reducers: Vec<Reducer>) -> Result<Self, SearchError> {
        if reducers.is_empty() {
            return Err(SearchError::EmptyReducerBank);
        }
        if reducers.len() > MAX_REDUCERS {
            return Err(SearchError::TooManyReducers {
                count: reducers.len(),
                max: MAX_REDUCERS,
            });
        }
        Ok(Self { reducers })
    }

    /// The standard 20-entry bank
    pub fn standard() -> Self {
        let reducers = STANDARD
            .iter()
            .map(|&(name, func)| Reducer::new(name, func))
            .collect();
        Self { reducers }
    }

    /// Number of reducers
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Always false for a constructed bank
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }

    /// Reducer at `index`
    pub fn get(&self, index: usize) -> Option<&Reducer> {
        self.reducers.get(index)
    }

    /// Reducers in index order
    pub fn iter(&self) -> impl Iterator<Item = &Reducer> {
        self.reducers.iter()
    }
}

impl Default for ReducerBank {
    fn default() -> Self {
        Self::standard()
    }
}
