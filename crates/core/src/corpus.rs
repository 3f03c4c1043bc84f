//! Fixed corpus of byte strings hashed under every nonce

use std::collections::HashMap;

use crate::error::SearchError;

/// Ordered, non-empty, duplicate-free sequence of byte strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringCorpus {
    strings: Vec<Vec<u8>>,
}

impl StringCorpus {
    /// Validate and wrap the corpus entries
    ///
    /// Duplicate entries would collide under every nonce, so they are
    /// rejected up front.
    pub fn new<I, S>(strings: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Vec<u8>>,
    {
        let strings: Vec<Vec<u8>> = strings.into_iter().map(Into::into).collect();
        if strings.is_empty() {
            return Err(SearchError::EmptyCorpus);
        }

        let mut seen: HashMap<&[u8], usize> = HashMap::with_capacity(strings.len());
        for (index, s) in strings.iter().enumerate() {
            if let Some(&first) = seen.get(s.as_slice()) {
                return Err(SearchError::DuplicateString { index, first });
            }
            seen.insert(s.as_slice(), index);
        }

        Ok(Self { strings })
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.strings.get(index).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.strings.iter().map(Vec::as_slice)
    }
}
