//! Wildcard query - pattern matching with `*` and `?`
//!
//! - `*` matches zero or more characters
//! - `?` matches exactly one character
//!
//! The literal text before the first wildcard narrows the candidates to a
//! prefix range of the term dictionary before the pattern is applied.

use crate::error::LexisError;
use crate::query::ast::QueryNode;
use crate::query::context::QueryContext;
use crate::query::types::WeightedTerm;
use crate::Result;
use regex::Regex;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WildcardQuery {
    /// Wildcard pattern (e.g., "prog*", "te?t")
    pub pattern: String,
    /// Maximum number of terms to expand, overriding the context's cap
    #[serde(default)]
    pub max_expansions: Option<usize>,
    #[serde(default = "default_boost")]
    pub boost: f32,
}

fn default_boost() -> f32 {
    1.0
}

impl WildcardQuery {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            max_expansions: None,
            boost: 1.0,
        }
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
        format!("wildcard:{}:{:?}", self.pattern, self.max_expansions)
    }

    /// Literal text before the first wildcard
    pub fn extract_prefix(pattern: &str) -> &str {
        let end = pattern.find(['*', '?']).unwrap_or(pattern.len());
        &pattern[..end]
    }

    pub fn has_wildcards(&self) -> bool {
        self.pattern.contains(['*', '?'])
    }

    /// Translate a wildcard pattern into an anchored regex
    pub fn pattern_to_regex(pattern: &str) -> Result<Regex> {
        let mut regex_pattern = String::with_capacity(pattern.len() + 8);
        regex_pattern.push('^');

        let mut literal = String::new();
        for ch in pattern.chars() {
            match ch {
                '*' | '?' => {
                    regex_pattern.push_str(&regex::escape(&literal));
                    literal.clear();
                    regex_pattern.push_str(if ch == '*' { ".*" } else { "." });
                }
                _ => literal.push(ch),
            }
        }
        regex_pattern.push_str(&regex::escape(&literal));
        regex_pattern.push('$');

        Regex::new(&regex_pattern)
            .map_err(|e| LexisError::QueryParse(format!("Invalid wildcard pattern: {}", e)))
    }

    /// Indexed terms matching the pattern, in sorted order
    pub fn expand(&self, ctx: &QueryContext) -> Result<Arc<Vec<String>>> {
        ctx.get_or_expand(&self.cache_key(), || {
            let pattern = ctx.analyzer().normalize_term(&self.pattern);
            if !pattern.contains(['*', '?']) {
                return Ok(if ctx.index().terms().contains(&pattern) {
                    vec![pattern]
                } else {
                    Vec::new()
                });
            }

            let regex = Self::pattern_to_regex(&pattern)?;
            let limit = self.max_expansions.or(ctx.max_expansions());
            let mut terms = Vec::new();
            for term in ctx.index().terms_with_prefix(Self::extract_prefix(&pattern), None) {
                if limit.is_some_and(|l| terms.len() >= l) {
                    break;
                }
                if regex.is_match(&term) {
                    terms.push(term);
                }
            }
            Ok(terms)
        })
    }
}

impl QueryNode for WildcardQuery {
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
        let prefix = Self::extract_prefix(&self.pattern);
        if prefix.is_empty() {
            // Leading wildcard scans the whole dictionary
            ctx.total_docs() as f64 * 10.0
        } else {
            ctx.total_docs() as f64 / (1.0 + prefix.chars().count() as f64)
        }
    }

    fn query_type(&self) -> &'static str {
        "wildcard"
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}
