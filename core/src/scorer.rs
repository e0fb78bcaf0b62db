//! Okapi BM25 contribution of one query term to one document.
//!
//! ```text
//! K   = k1 * ((1 - b) + b * dl / avdl)
//! idf = ln( ((r + 0.5) / (R - r + 0.5)) / ((n - r + 0.5) / (N - n - R + r + 0.5)) )
//! tf  = ((k1 + 1) * f) / (K + f)
//! qtf = ((k2 + 1) * qf) / (k2 + qf)
//! score = idf * tf * qtf
//! ```
//!
//! Inputs outside the model's domain are reported as
//! [`Bm25Error::ScoreDomain`]; nothing is clamped. A negative idf (term in
//! more than half the corpus) is inside the domain and is returned unchanged.

use crate::error::{Bm25Error, Result};
use crate::params::{Bm25Params, QUERY_TERM_FREQUENCY, RELEVANT_WITH_TERM, TOTAL_RELEVANT};

/// Index-derived statistics for one (term, document) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermStats {
    /// Documents containing the term.
    pub n: u32,
    /// Occurrences of the term in the scored document.
    pub f: u32,
    /// Occurrences of the term in the query.
    pub qf: u32,
    /// Relevant documents containing the term.
    pub r: u32,
    /// Relevant documents overall.
    pub big_r: u32,
    pub total_docs: u32,
    pub dl: u32,
    pub avdl: f64,
}

impl TermStats {
    /// Stats for the no-feedback model with the fixed query term frequency.
    pub fn new(n: u32, f: u32, total_docs: u32, dl: u32, avdl: f64) -> Self {
        Self { n, f, qf: QUERY_TERM_FREQUENCY, r: RELEVANT_WITH_TERM, big_r: TOTAL_RELEVANT, total_docs, dl, avdl }
    }
}

/// Scores with the default constants.
pub fn score_term(stats: &TermStats) -> Result<f64> {
    Bm25Params::default().score(stats)
}

impl Bm25Params {
    pub fn score(&self, s: &TermStats) -> Result<f64> {
        if !s.avdl.is_finite() || s.avdl <= 0.0 {
            return Err(Bm25Error::ScoreDomain { reason: format!("average document length must be positive, got {}", s.avdl) });
        }
        let idf = self.idf(s)?;
        let tf = self.tf(s);
        let qtf = self.qtf(s.qf);
        let score = idf * tf * qtf;
        if !score.is_finite() {
            return Err(Bm25Error::ScoreDomain { reason: format!("non-finite score for {s:?}") });
        }
        Ok(score)
    }

    /// Length normalizer K.
    pub fn length_norm(&self, dl: u32, avdl: f64) -> f64 {
        self.k1 * ((1.0 - self.b) + self.b * (dl as f64 / avdl))
    }

    fn idf(&self, s: &TermStats) -> Result<f64> {
        let (n, r, big_r, total) = (s.n as f64, s.r as f64, s.big_r as f64, s.total_docs as f64);
        let relevant = (r + 0.5) / (big_r - r + 0.5);
        let non_relevant = (n - r + 0.5) / (total - n - big_r + r + 0.5);
        let arg = relevant / non_relevant;
        if !arg.is_finite() || arg <= 0.0 {
            return Err(Bm25Error::ScoreDomain {
                reason: format!("idf log argument {arg} is not positive (n={}, N={}, r={}, R={})", s.n, s.total_docs, s.r, s.big_r),
            });
        }
        Ok(arg.ln())
    }

    fn tf(&self, s: &TermStats) -> f64 {
        let f = s.f as f64;
        ((self.k1 + 1.0) * f) / (self.length_norm(s.dl, s.avdl) + f)
    }

    fn qtf(&self, qf: u32) -> f64 {
        let qf = qf as f64;
        ((self.k2 + 1.0) * qf) / (self.k2 + qf)
    }
}
