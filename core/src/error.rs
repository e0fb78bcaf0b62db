use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Term,
    Document,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKind::Term => f.write_str("term"),
            LookupKind::Document => f.write_str("document"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Bm25Error {
    /// A term or document id was required but is not indexed.
    #[error("{kind} not found: {key}")]
    NotFound { kind: LookupKind, key: String },

    #[error("average document length is undefined for an empty corpus")]
    EmptyCorpus,

    /// The BM25 inputs leave the model's domain (non-positive log argument,
    /// non-positive average length, or a non-finite result).
    #[error("bm25 score out of domain: {reason}")]
    ScoreDomain { reason: String },

    /// Index and length table disagree; only raised on the query path.
    #[error("index invariant violated: {0}")]
    Invariant(String),
}

impl Bm25Error {
    pub fn term_not_found(term: &str) -> Self {
        Bm25Error::NotFound { kind: LookupKind::Term, key: term.to_string() }
    }

    pub fn doc_not_found(doc_id: &str) -> Self {
        Bm25Error::NotFound { kind: LookupKind::Document, key: doc_id.to_string() }
    }

    pub fn is_not_found(&self) -> bool { matches!(self, Bm25Error::NotFound { .. }) }
}

pub type Result<T> = std::result::Result<T, Bm25Error>;
