//! Scoring functions for search operations
//!
//! Ranking is plain TF-IDF summed over the positive terms a query expanded
//! to: `score(d) = Σ boost_t · tf(t, d) · ln(N / (1 + df(t)))`.

use std::collections::BTreeMap;

use crate::query::context::QueryContext;
use crate::query::types::WeightedTerm;
use crate::segment::{DocId, PostingList};

/// Inverse document frequency
///
/// # Arguments
/// * `total_docs` - Number of documents in the index (N)
/// * `doc_frequency` - Number of documents containing the term (df)
///
/// # Returns
/// `ln(N / (1 + df))`. Negative when a term occurs in every document, and
/// zero for an empty index.
pub fn idf(total_docs: u32, doc_frequency: u32) -> f32 {
    if total_docs == 0 {
        return 0.0;
    }
    (total_docs as f64 / (1.0 + doc_frequency as f64)).ln() as f32
}

/// TF-IDF contribution of one term occurring `tf` times in a document
pub fn tf_idf(term_frequency: u32, idf: f32) -> f32 {
    term_frequency as f32 * idf
}

/// A scoring term with its precomputed weight
#[derive(Clone, Debug)]
pub struct TermWeight<'a> {
    pub term: String,
    pub doc_frequency: u32,
    pub idf: f32,
    /// Summed boost of every clause that scores with this term
    pub boost: f32,
    postings: &'a PostingList,
}

impl TermWeight<'_> {
    /// Contribution of this term to `doc_id`'s score
    pub fn score(&self, doc_id: DocId) -> f32 {
        match self.postings.term_frequency(doc_id) {
            0 => 0.0,
            tf => self.boost * tf_idf(tf, self.idf),
        }
    }
}

/// Scores matched documents against one query
///
/// Built once per search: idf and posting lookups happen here, so scoring a
/// document only reads term frequencies.
#[derive(Debug)]
pub struct Scorer<'a> {
    weights: Vec<TermWeight<'a>>,
}

impl<'a> Scorer<'a> {
    /// Terms missing from the dictionary are dropped; a term listed by
    /// several clauses is kept once with the boosts summed.
    pub fn new(ctx: &QueryContext<'a>, terms: Vec<WeightedTerm>) -> Self {
        let mut merged: BTreeMap<String, f32> = BTreeMap::new();
        for WeightedTerm { term, boost } in terms {
            *merged.entry(term).or_insert(0.0) += boost;
        }

        let total_docs = ctx.total_docs();
        let weights = merged
            .into_iter()
            .filter_map(|(term, boost)| {
                let postings = ctx.postings(&term)?;
                let doc_frequency = postings.doc_frequency();
                Some(TermWeight {
                    idf: idf(total_docs, doc_frequency),
                    doc_frequency,
                    term,
                    boost,
                    postings,
                })
            })
            .collect();

        Self { weights }
    }

    pub fn score(&self, doc_id: DocId) -> f32 {
        self.weights.iter().map(|w| w.score(doc_id)).sum()
    }

    /// Weighted terms in lexicographic order
    pub fn weights(&self) -> &[TermWeight<'a>] {
        &self.weights
    }

    pub fn term_count(&self) -> usize {
        self.weights.len()
    }
}
