use crate::error::{Bm25Error, Result};
use crate::DocId;
use std::collections::HashMap;

/// Per-document term counts (duplicates included).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentLengthTable {
    table: HashMap<DocId, u32>,
}

impl DocumentLengthTable {
    pub fn new() -> Self { Self::default() }

    /// Records a document's length. Re-adding an id overwrites it.
    pub fn add(&mut self, doc_id: impl Into<DocId>, length: u32) {
        self.table.insert(doc_id.into(), length);
    }

    pub fn length(&self, doc_id: &str) -> Result<u32> {
        self.table.get(doc_id).copied().ok_or_else(|| Bm25Error::doc_not_found(doc_id))
    }

    pub fn len(&self) -> usize { self.table.len() }

    pub fn is_empty(&self) -> bool { self.table.is_empty() }

    pub fn total_length(&self) -> u64 {
        self.table.values().map(|&l| l as u64).sum()
    }

    pub fn average_length(&self) -> Result<f64> {
        if self.table.is_empty() {
            return Err(Bm25Error::EmptyCorpus);
        }
        Ok(self.total_length() as f64 / self.table.len() as f64)
    }

    /// Folds another table into this one, last write wins per id.
    pub fn merge(&mut self, other: DocumentLengthTable) {
        self.table.extend(other.table);
    }
}
