use crate::error::{Bm25Error, Result};

/// Total number of documents known to be relevant (R). No relevance feedback.
pub const TOTAL_RELEVANT: u32 = 0;
/// Relevant documents that contain the scored term (r). No relevance feedback.
pub const RELEVANT_WITH_TERM: u32 = 0;
/// Every query term is scored as if it occurred once in the query, even when
/// the query repeats it. Repeats still contribute once per occurrence.
pub const QUERY_TERM_FREQUENCY: u32 = 1;

/// Tunable BM25 constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Document term-frequency saturation.
    pub k1: f64,
    /// Query term-frequency saturation.
    pub k2: f64,
    /// Length normalization, 0 disables it and 1 applies it fully.
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, k2: 100.0, b: 0.75 }
    }
}

impl Bm25Params {
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(Bm25Error::ScoreDomain { reason: format!("k1 must be a non-negative number, got {}", self.k1) });
        }
        if !self.k2.is_finite() || self.k2 < 0.0 {
            return Err(Bm25Error::ScoreDomain { reason: format!("k2 must be a non-negative number, got {}", self.k2) });
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Bm25Error::ScoreDomain { reason: format!("b must lie in [0, 1], got {}", self.b) });
        }
        Ok(())
    }
}
