//! Result reporting
//!
//! Nonces, spans and digests are rendered in hex; reducer indices and reduced
//! spans stay decimal.

use serde::{Serialize, Serializer};

use crate::algorithm::{EvaluationResult, HashValue, KeyedHash, PrecomputedTable, StringCorpus};

fn as_hex<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:#010x}", value))
}

/// Output record for one evaluated nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchReport {
    #[serde(serialize_with = "as_hex")]
    pub nonce: u32,
    #[serde(serialize_with = "as_hex")]
    pub span: HashValue,
    pub reducer: u8,
    pub reduced_span: u8,
}

impl SearchReport {
    /// Report for a search winner; `None` if no reducer separated the corpus
    pub fn from_result(result: EvaluationResult) -> Option<Self> {
        if result.is_valid() {
            Some(Self::from(result))
        } else {
            None
        }
    }

    /// Single-line JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// `key=value` pairs on one line
    pub fn to_text(&self) -> String {
        format!(
            "nonce={:#010x} span={:#010x} reducer={} reduced_span={}",
            self.nonce, self.span, self.reducer, self.reduced_span
        )
    }
}

impl From<EvaluationResult> for SearchReport {
    fn from(result: EvaluationResult) -> Self {
        Self {
            nonce: result.nonce,
            span: result.span,
            reducer: result.reducer,
            reduced_span: result.reduced_span,
        }
    }
}

/// One corpus string in a table report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow<V = usize> {
    pub index: usize,
    pub string: String,
    /// Digest bytes as produced by the hash
    pub hash: String,
    pub check: u16,
    pub reduced: u8,
    /// `reduced - offset`, the key fed to the row displacement
    pub shifted: usize,
    pub slot: usize,
    pub value: V,
}

/// Serializable view of a precomputed table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport<V = usize> {
    #[serde(serialize_with = "as_hex")]
    pub nonce: u32,
    pub reducer: usize,
    pub formula: String,
    pub offset: u8,
    pub reduced_span: u8,
    /// Row width `t`
    pub width: usize,
    /// Row displacement vector `r`
    pub displacement: Vec<usize>,
    pub slots: usize,
    pub entries: Vec<TableRow<V>>,
}

impl<V: Clone> TableReport<V> {
    pub fn new<H: KeyedHash>(table: &PrecomputedTable<'_, H, V>, corpus: &StringCorpus) -> Self {
        let entries = table
            .entries()
            .iter()
            .map(|entry| TableRow {
                index: entry.index,
                string: corpus
                    .get(entry.index)
                    .map(|s| String::from_utf8_lossy(s).into_owned())
                    .unwrap_or_default(),
                hash: hex::encode(entry.hash.to_le_bytes()),
                check: entry.half,
                reduced: entry.reduced,
                shifted: entry.shifted,
                slot: entry.slot,
                value: table.values()[entry.index].clone(),
            })
            .collect();

        Self {
            nonce: table.nonce(),
            reducer: table.reducer_index(),
            formula: table.reducer().name().to_string(),
            offset: table.offset(),
            reduced_span: table.reduced_span(),
            width: table.layout().width(),
            displacement: table.layout().displacement().to_vec(),
            slots: table.slots().len(),
            entries,
        }
    }
}

impl<V: Serialize> TableReport<V> {
    /// Indented JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
