use crate::error::{Bm25Error, LookupKind, Result};
use crate::{DocId, Term};
use std::collections::HashMap;

/// Document id to occurrence count of one term.
pub type Postings = HashMap<DocId, u32>;

/// Term to postings. A doc appears under a term iff it contains the term,
/// and the stored frequency is its exact occurrence count (always >= 1).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvertedIndex {
    postings: HashMap<Term, Postings>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn contains(&self, term: &str) -> bool { self.postings.contains_key(term) }

    /// Counts one occurrence of `term` in `doc_id`.
    pub fn add(&mut self, term: &str, doc_id: &str) {
        let plist = self.postings.entry(term.to_string()).or_default();
        *plist.entry(doc_id.to_string()).or_insert(0) += 1;
    }

    pub fn postings(&self, term: &str) -> Result<&Postings> {
        self.postings.get(term).ok_or_else(|| Bm25Error::term_not_found(term))
    }

    /// Number of distinct documents containing `term`.
    pub fn document_frequency(&self, term: &str) -> Result<usize> {
        self.postings(term).map(|p| p.len())
    }

    /// Occurrences of `term` in `doc_id`; absent pairs are `NotFound`, not zero.
    pub fn frequency(&self, term: &str, doc_id: &str) -> Result<u32> {
        self.postings(term)?
            .get(doc_id)
            .copied()
            .ok_or_else(|| Bm25Error::NotFound { kind: LookupKind::Document, key: format!("{doc_id} (for term {term})") })
    }

    pub fn term_count(&self) -> usize { self.postings.len() }

    /// Adds every frequency of `other` into this index.
    pub fn merge(&mut self, other: InvertedIndex) {
        for (term, plist) in other.postings {
            let target = self.postings.entry(term).or_default();
            for (doc_id, f) in plist {
                *target.entry(doc_id).or_insert(0) += f;
            }
        }
    }
}
