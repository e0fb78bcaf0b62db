//! Inverted index construction and Okapi BM25 ranking over pre-tokenized text.
//!
//! Build once with [`build`] (or [`build_parallel`]), then hand shared
//! references to a [`QueryProcessor`]. Nothing on the query path mutates the
//! index, so any number of threads may query the same structures.

pub mod builder;
pub mod error;
pub mod index;
pub mod lengths;
pub mod params;
pub mod parse;
mod pool;
pub mod query;
pub mod rank;
pub mod scorer;

pub use builder::{build, build_parallel};
pub use error::{Bm25Error, LookupKind, Result};
pub use index::InvertedIndex;
pub use lengths::DocumentLengthTable;
pub use params::Bm25Params;
pub use query::{QueryProcessor, ScoreMap};
pub use rank::{rank, RankedHit, DEFAULT_TOP_N};
pub use scorer::{score_term, TermStats};

use std::collections::HashMap;

pub type DocId = String;
pub type Term = String;
pub type Query = Vec<Term>;
pub type Corpus = HashMap<DocId, Vec<Term>>;
