use crate::query::ScoreMap;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_TOP_N: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHit {
    /// Dense, 0-based.
    pub rank: usize,
    pub doc_id: DocId,
    pub score: f64,
}

/// Orders by score descending, ties by doc id ascending, and keeps `top_n`.
pub fn rank(scores: &ScoreMap, top_n: usize) -> Vec<RankedHit> {
    let mut scored: Vec<(&DocId, f64)> = scores.iter().map(|(d, &s)| (d, s)).collect();
    scored.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.0.cmp(b.0),
        ord => ord,
    });
    scored
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(rank, (doc_id, score))| RankedHit { rank, doc_id: doc_id.clone(), score })
        .collect()
}
