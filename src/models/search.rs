use serde::{Deserialize, Serialize};

use crate::query::types::QueryStats;
use crate::segment::DocId;

/// Search result with relevance score
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub doc_id: DocId,
    /// Stored text of the document
    pub value: String,
    pub score: f32,
}

impl ScoredResult {
    pub fn new(doc_id: DocId, value: impl Into<String>, score: f32) -> Self {
        Self {
            doc_id,
            value: value.into(),
            score,
        }
    }
}

/// Search response with timing information
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<ScoredResult>,
    /// Matches before the result limit was applied
    pub total_hits: u64,
    pub took_us: u64,
    pub stats: QueryStats,
}

/// How one query term contributes to scores
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermExplanation {
    pub term: String,
    pub doc_frequency: u32,
    pub idf: f32,
    pub boost: f32,
}

/// Diagnostic breakdown of a query against one index
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub query_type: String,
    pub total_docs: u32,
    /// Documents the query matches, before any limit
    pub matched_docs: u64,
    /// Indexed terms the query scores with, lexicographically
    pub terms: Vec<TermExplanation>,
}

/// Reorder results alphabetically by stored text, ties by DocId
///
/// A presentation choice; ranking order is lost.
pub fn sort_by_stored_value(results: &mut [ScoredResult]) {
    results.sort_by(|a, b| a.value.cmp(&b.value).then(a.doc_id.cmp(&b.doc_id)));
}
