use crate::index::InvertedIndex;
use crate::lengths::DocumentLengthTable;
use crate::pool::in_pool;
use crate::{Corpus, Term};
use rayon::prelude::*;

/// Builds the inverted index and length table in one pass over the corpus.
pub fn build(corpus: &Corpus) -> (InvertedIndex, DocumentLengthTable) {
    let mut index = InvertedIndex::new();
    let mut lengths = DocumentLengthTable::new();
    for (doc_id, terms) in corpus {
        index_document(&mut index, &mut lengths, doc_id, terms);
    }
    tracing::info!(num_docs = lengths.len(), num_terms = index.term_count(), "index built");
    (index, lengths)
}

/// Same result as [`build`], with documents indexed in parallel. Each rayon
/// task folds its share into a private partial index; partials are merged
/// pairwise. `workers` sizes a dedicated pool, 0 uses rayon's global pool.
pub fn build_parallel(corpus: &Corpus, workers: usize) -> (InvertedIndex, DocumentLengthTable) {
    let (index, lengths) = in_pool(workers, || {
        corpus
            .par_iter()
            .fold(
                || (InvertedIndex::new(), DocumentLengthTable::new()),
                |(mut index, mut lengths), (doc_id, terms)| {
                    index_document(&mut index, &mut lengths, doc_id, terms);
                    (index, lengths)
                },
            )
            .reduce(
                || (InvertedIndex::new(), DocumentLengthTable::new()),
                |(mut index, mut lengths), (other_index, other_lengths)| {
                    index.merge(other_index);
                    lengths.merge(other_lengths);
                    (index, lengths)
                },
            )
    });
    tracing::info!(num_docs = lengths.len(), num_terms = index.term_count(), workers, "index built");
    (index, lengths)
}

fn index_document(index: &mut InvertedIndex, lengths: &mut DocumentLengthTable, doc_id: &str, terms: &[Term]) {
    for term in terms {
        index.add(term, doc_id);
    }
    lengths.add(doc_id, terms.len() as u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(docs: &[(&str, &str)]) -> Corpus {
        docs.iter()
            .map(|(id, text)| (id.to_string(), text.split_whitespace().map(String::from).collect()))
            .collect()
    }

    #[test]
    fn builds_postings_and_lengths() {
        let c = corpus(&[("d1", "a a b"), ("d2", "a c")]);
        let (index, lengths) = build(&c);
        let a = index.postings("a").unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a["d1"], 2);
        assert_eq!(a["d2"], 1);
        assert_eq!(index.document_frequency("a").unwrap(), 2);
        assert_eq!(lengths.length("d1").unwrap(), 3);
        assert_eq!(lengths.length("d2").unwrap(), 2);
        assert_eq!(lengths.average_length().unwrap(), 2.5);
    }

    #[test]
    fn empty_document_has_length_but_no_postings() {
        let c = corpus(&[("d1", ""), ("d2", "x")]);
        let (index, lengths) = build(&c);
        assert_eq!(lengths.length("d1").unwrap(), 0);
        assert!(index.frequency("x", "d1").is_err());
    }

    #[test]
    fn parallel_build_matches_sequential() {
        let docs: Vec<(String, Vec<String>)> = (0..50)
            .map(|i| {
                let terms = (0..(i % 7 + 1)).map(|j| format!("t{}", (i + j) % 11)).collect();
                (format!("doc{i}"), terms)
            })
            .collect();
        let c: Corpus = docs.into_iter().collect();
        let seq = build(&c);
        for workers in [0, 1, 2, 3, 8] {
            assert_eq!(build_parallel(&c, workers), seq, "workers = {workers}");
        }
    }
}
