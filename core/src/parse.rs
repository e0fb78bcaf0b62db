//! Plain-text corpus and query files.
//!
//! Corpus: each document starts with `#` at the beginning of a line; the first
//! token after it is the doc id and every following whitespace-separated
//! token, up to the next marker, is a term. Queries: one per line.
//! Tokens are taken verbatim, normalization happens upstream.

use crate::{Corpus, Query};
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;

lazy_static! {
    static ref DOC_MARKER: Regex = Regex::new(r"(?m)^[ \t]*#").expect("valid regex");
}

pub fn parse_corpus(text: &str) -> Corpus {
    let mut corpus = Corpus::new();
    for blob in DOC_MARKER.split(text).skip(1) {
        let mut tokens = blob.split_whitespace();
        let Some(doc_id) = tokens.next() else {
            tracing::warn!("skipping document marker without an id");
            continue;
        };
        if corpus.insert(doc_id.to_string(), tokens.map(String::from).collect()).is_some() {
            tracing::warn!(doc_id, "duplicate document id, keeping the last one");
        }
    }
    corpus
}

pub fn parse_queries(text: &str) -> Vec<Query> {
    text.lines().map(|line| line.split_whitespace().map(String::from).collect()).collect()
}

pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Corpus> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("reading corpus {}", path.display()))?;
    let corpus = parse_corpus(&text);
    tracing::info!(path = %path.display(), num_docs = corpus.len(), "corpus loaded");
    Ok(corpus)
}

pub fn load_queries<P: AsRef<Path>>(path: P) -> Result<Vec<Query>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("reading queries {}", path.display()))?;
    Ok(parse_queries(&text))
}
