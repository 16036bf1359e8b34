//! Fuzzy query - matches terms within an edit distance
//!
//! Edit distance is Levenshtein over characters (insertions, deletions,
//! substitutions). The budget comes from [`Fuzziness`]: either a fixed
//! number of edits or a minimum similarity scaled by the shorter term.
//!
//! # Example
//!
//! ```rust
//! use lexis::query::{Fuzziness, nodes::FuzzyQuery};
//!
//! // "miscle" with similarity 0.2 also matches "muscle"
//! let query = FuzzyQuery::new("miscle", Fuzziness::Similarity(0.2));
//! ```

use crate::query::ast::QueryNode;
use crate::query::context::QueryContext;
use crate::query::types::{Fuzziness, WeightedTerm};
use crate::Result;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FuzzyQuery {
    /// Term to match approximately
    pub term: String,
    pub fuzziness: Fuzziness,
    /// Number of leading characters that must match exactly
    #[serde(default)]
    pub prefix_length: usize,
    /// Keep only the closest N terms, overriding the context's cap
    #[serde(default)]
    pub max_expansions: Option<usize>,
    #[serde(default = "default_boost")]
    pub boost: f32,
}

fn default_boost() -> f32 {
    1.0
}

impl FuzzyQuery {
    pub fn new(term: impl Into<String>, fuzziness: Fuzziness) -> Self {
        Self {
            term: term.into(),
            fuzziness,
            prefix_length: 0,
            max_expansions: None,
            boost: 1.0,
        }
    }

    /// Set the prefix length (characters that must match exactly)
    pub fn with_prefix_length(mut self, prefix_length: usize) -> Self {
        self.prefix_length = prefix_length;
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    pub fn cache_key(&self) -> String {
        format!(
            "fuzzy:{}:{:?}:{}:{:?}",
            self.term, self.fuzziness, self.prefix_length, self.max_expansions
        )
    }

    /// Leading characters of `term` that candidates must share
    fn required_prefix(term: &str, prefix_length: usize) -> &str {
        let end = term
            .char_indices()
            .nth(prefix_length)
            .map(|(i, _)| i)
            .unwrap_or(term.len());
        &term[..end]
    }

    /// Indexed terms within the edit budget, in sorted order
    pub fn expand(&self, ctx: &QueryContext) -> Result<Arc<Vec<String>>> {
        ctx.get_or_expand(&self.cache_key(), || {
            self.fuzziness.validate()?;

            let term = ctx.analyzer().normalize_term(self.term.trim());
            if term.is_empty() {
                return Ok(Vec::new());
            }
            if self.fuzziness.is_exact() {
                return Ok(if ctx.index().terms().contains(&term) {
                    vec![term]
                } else {
                    Vec::new()
                });
            }

            let query_len = term.chars().count();
            let bound = self.fuzziness.max_distance_bound(query_len);
            let prefix = Self::required_prefix(&term, self.prefix_length);

            let mut matches: Vec<(usize, String)> = Vec::new();
            for candidate in ctx.index().terms_with_prefix(prefix, None) {
                let candidate_len = candidate.chars().count();
                if candidate_len.abs_diff(query_len) > bound {
                    continue;
                }
                let budget = self.fuzziness.max_distance(query_len, candidate_len);
                if candidate_len.abs_diff(query_len) > budget {
                    continue;
                }
                let distance = levenshtein_distance(&term, &candidate);
                if self.fuzziness.accepts(distance, query_len, candidate_len) {
                    matches.push((distance, candidate));
                }
            }

            if let Some(limit) = self.max_expansions.or(ctx.max_expansions()) {
                matches.sort();
                matches.truncate(limit);
            }

            let mut terms: Vec<String> = matches.into_iter().map(|(_, t)| t).collect();
            terms.sort();
            Ok(terms)
        })
    }
}

impl QueryNode for FuzzyQuery {
    fn execute(&self, ctx: &QueryContext) -> Result<RoaringBitmap> {
        let terms = self.expand(ctx)?;
        ctx.get_or_cache_filter(&self.cache_key(), || Ok(ctx.union_terms(terms.as_slice())))
    }

    fn scoring_terms(&self, ctx: &QueryContext) -> Result<Vec<WeightedTerm>> {
        Ok(self
            .expand(ctx)?
            .iter()
            .map(|term| WeightedTerm::new(term.as_str(), self.boost))
            .collect())
    }

    fn estimate_cost(&self, ctx: &QueryContext) -> f64 {
        let base_cost = ctx.total_docs() as f64;
        let edits = self.fuzziness.max_distance_bound(self.term.chars().count());
        let fuzz_factor = 1.0 + edits as f64;
        let prefix_factor = 1.0 / (1.0 + self.prefix_length as f64);

        base_cost * fuzz_factor * prefix_factor * 0.5
    }

    fn query_type(&self) -> &'static str {
        "fuzzy"
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}

/// Levenshtein edit distance between two strings, counted in characters
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let (shorter, longer) = if len1 <= len2 {
        (&s1_chars, &s2_chars)
    } else {
        (&s2_chars, &s1_chars)
    };
    let short_len = shorter.len();

    // Two rows are enough
    let mut prev_row: Vec<usize> = (0..=short_len).collect();
    let mut curr_row = vec![0; short_len + 1];

    for (i, long_ch) in longer.iter().enumerate() {
        curr_row[0] = i + 1;

        for j in 1..=short_len {
            let cost = if *long_ch == shorter[j - 1] { 0 } else { 1 };

            curr_row[j] = (prev_row[j] + 1) // deletion
                .min(curr_row[j - 1] + 1) // insertion
                .min(prev_row[j - 1] + cost); // substitution
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[short_len]
}
