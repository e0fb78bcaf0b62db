use crate::error::{Bm25Error, Result};
use crate::index::{InvertedIndex, Postings};
use crate::lengths::DocumentLengthTable;
use crate::params::Bm25Params;
use crate::pool::in_pool;
use crate::scorer::TermStats;
use crate::{DocId, Query, Term};
use rayon::prelude::*;
use std::collections::HashMap;

/// Accumulated score per document for one query.
pub type ScoreMap = HashMap<DocId, f64>;

/// Read-only query evaluation over a built index.
///
/// Only documents with at least one matching posting get a score. Repeated
/// query terms are scored once per occurrence, each with the fixed query
/// term frequency.
#[derive(Debug, Clone, Copy)]
pub struct QueryProcessor<'a> {
    index: &'a InvertedIndex,
    lengths: &'a DocumentLengthTable,
    params: Bm25Params,
}

impl<'a> QueryProcessor<'a> {
    pub fn new(index: &'a InvertedIndex, lengths: &'a DocumentLengthTable, params: Bm25Params) -> Self {
        Self { index, lengths, params }
    }

    pub fn run_query(&self, query: &[Term]) -> Result<ScoreMap> {
        let mut scores = ScoreMap::new();
        let total_docs = self.lengths.len() as u32;
        let mut avg_len: Option<f64> = None;

        for term in query {
            // Absent terms contribute nothing.
            let Ok(postings) = self.index.postings(term) else { continue };
            let avdl = match avg_len {
                Some(v) => v,
                None => *avg_len.insert(self.lengths.average_length()?),
            };
            let resolved = self.resolve_postings(term, postings, total_docs)?;
            let n = resolved.len() as u32;
            for (doc_id, f, dl) in resolved {
                let score = self.params.score(&TermStats::new(n, f, total_docs, dl, avdl))?;
                *scores.entry(doc_id.clone()).or_insert(0.0) += score;
            }
        }
        Ok(scores)
    }

    /// Pairs every posting of `term` with its document length, failing
    /// before any scoring when the index and length table disagree.
    fn resolve_postings<'p>(&self, term: &str, postings: &'p Postings, total_docs: u32) -> Result<Vec<(&'p DocId, u32, u32)>> {
        if postings.len() > total_docs as usize {
            tracing::error!(%term, df = postings.len(), total_docs, "term occurs in more documents than have lengths");
            return Err(Bm25Error::Invariant(format!(
                "term {term} has {} postings but only {total_docs} documents have lengths",
                postings.len()
            )));
        }
        postings
            .iter()
            .map(|(doc_id, &f)| match self.lengths.length(doc_id) {
                Ok(dl) => Ok((doc_id, f, dl)),
                Err(err) => {
                    tracing::error!(%doc_id, %term, "posting references a document without a recorded length");
                    Err(Bm25Error::Invariant(err.to_string()))
                }
            })
            .collect()
    }

    /// One result per query, in input order. A failing query does not
    /// affect the others.
    pub fn run(&self, queries: &[Query]) -> Vec<Result<ScoreMap>> {
        queries.iter().enumerate().map(|(qid, q)| self.run_logged(qid, q)).collect()
    }

    /// Same as [`run`](Self::run), evaluated on rayon. `workers` sizes a
    /// dedicated pool, 0 uses rayon's global pool.
    pub fn run_parallel(&self, queries: &[Query], workers: usize) -> Vec<Result<ScoreMap>> {
        in_pool(workers, || queries.par_iter().enumerate().map(|(qid, q)| self.run_logged(qid, q)).collect())
    }

    fn run_logged(&self, qid: usize, query: &[Term]) -> Result<ScoreMap> {
        let result = self.run_query(query);
        match &result {
            Ok(scores) => tracing::debug!(qid, terms = query.len(), hits = scores.len(), "query evaluated"),
            Err(err) => tracing::warn!(qid, %err, "query failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::Corpus;

    fn sample() -> Corpus {
        [("d1", vec!["a", "a", "b"]), ("d2", vec!["a", "c"]), ("d3", vec!["c", "d", "e", "f"])]
            .into_iter()
            .map(|(id, t)| (id.to_string(), t.into_iter().map(String::from).collect()))
            .collect()
    }

    fn q(terms: &[&str]) -> Query { terms.iter().map(|t| t.to_string()).collect() }

    #[test]
    fn scores_only_matching_documents() {
        let (index, lengths) = build(&sample());
        let qp = QueryProcessor::new(&index, &lengths, Bm25Params::default());
        let scores = qp.run_query(&q(&["a"])).unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores.contains_key("d1"));
        assert!(scores.contains_key("d2"));
        // 2 of 3 documents contain "a": negative idf.
        assert!(scores["d1"] < scores["d2"]);
        assert!(scores["d2"] < 0.0);
    }

    #[test]
    fn absent_term_yields_empty_map() {
        let (index, lengths) = build(&sample());
        let qp = QueryProcessor::new(&index, &lengths, Bm25Params::default());
        assert!(qp.run_query(&q(&["z"])).unwrap().is_empty());
        assert!(qp.run_query(&[]).unwrap().is_empty());
    }

    #[test]
    fn contributions_add_across_terms() {
        let (index, lengths) = build(&sample());
        let qp = QueryProcessor::new(&index, &lengths, Bm25Params::default());
        let a = qp.run_query(&q(&["a"])).unwrap();
        let b = qp.run_query(&q(&["b"])).unwrap();
        let ab = qp.run_query(&q(&["a", "b"])).unwrap();
        assert!((ab["d1"] - (a["d1"] + b["d1"])).abs() < 1e-12);
        assert!((ab["d2"] - a["d2"]).abs() < 1e-12);
    }

    #[test]
    fn repeated_query_term_counts_twice() {
        let (index, lengths) = build(&sample());
        let qp = QueryProcessor::new(&index, &lengths, Bm25Params::default());
        let once = qp.run_query(&q(&["b"])).unwrap();
        let twice = qp.run_query(&q(&["b", "b"])).unwrap();
        assert!((twice["d1"] - 2.0 * once["d1"]).abs() < 1e-12);
    }

    #[test]
    fn missing_length_is_an_invariant_violation() {
        let (index, _) = build(&sample());
        let mut lengths = DocumentLengthTable::new();
        lengths.add("d1", 3);
        let qp = QueryProcessor::new(&index, &lengths, Bm25Params::default());
        let results = qp.run(&[q(&["c"]), q(&["b"])]);
        assert!(matches!(results[0], Err(Bm25Error::Invariant(_))));
        assert!(results[1].as_ref().unwrap().contains_key("d1"));
    }

    #[test]
    fn oversized_posting_list_is_an_invariant_violation_in_any_order() {
        let corpus: Corpus = (0..8).map(|i| (format!("d{i}"), vec!["a".to_string()])).collect();
        let mut lengths = DocumentLengthTable::new();
        lengths.add("d0", 1);
        for _ in 0..20 {
            // fresh hash seeds each round
            let (index, _) = build(&corpus.clone().into_iter().collect());
            let qp = QueryProcessor::new(&index, &lengths, Bm25Params::default());
            assert!(matches!(qp.run_query(&q(&["a"])), Err(Bm25Error::Invariant(_))));
        }
    }

    #[test]
    fn missing_length_is_found_before_scoring() {
        let mut lengths = DocumentLengthTable::new();
        lengths.add("d1", 3);
        lengths.add("d3", 4);
        for _ in 0..20 {
            let (index, _) = build(&sample());
            let qp = QueryProcessor::new(&index, &lengths, Bm25Params::default());
            let err = qp.run_query(&q(&["a"])).unwrap_err();
            assert!(matches!(&err, Bm25Error::Invariant(msg) if msg.contains("d2")), "{err}");
        }
    }

    #[test]
    fn empty_length_table_fails_only_matching_queries() {
        let (index, _) = build(&sample());
        let lengths = DocumentLengthTable::new();
        let qp = QueryProcessor::new(&index, &lengths, Bm25Params::default());
        let results = qp.run(&[q(&["a"]), q(&["z"])]);
        assert_eq!(results[0], Err(Bm25Error::EmptyCorpus));
        assert!(results[1].as_ref().unwrap().is_empty());
    }

    #[test]
    fn parallel_run_matches_sequential() {
        let (index, lengths) = build(&sample());
        let qp = QueryProcessor::new(&index, &lengths, Bm25Params::default());
        let queries: Vec<Query> = (0..17)
            .map(|i| match i % 4 {
                0 => q(&["a"]),
                1 => q(&["c", "d"]),
                2 => q(&["zz"]),
                _ => q(&["a", "b", "c"]),
            })
            .collect();
        let seq = qp.run(&queries);
        for workers in [0, 2, 4] {
            assert_eq!(qp.run_parallel(&queries, workers), seq);
        }
    }
}
