//! Prefix query - matches terms starting with a prefix
//!
//! The prefix is case-folded like indexed terms but not otherwise analyzed,
//! and expands through the FST term dictionary to every indexed term that
//! starts with it.

use crate::query::ast::QueryNode;
use crate::query::context::QueryContext;
use crate::query::types::WeightedTerm;
use crate::Result;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrefixQuery {
    /// Prefix to match
    pub prefix: String,
    /// Maximum number of terms to expand, overriding the context's cap
    #[serde(default)]
    pub max_expansions: Option<usize>,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
}

fn default_boost() -> f32 {
    1.0
}

impl PrefixQuery {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            max_expansions: None,
            boost: 1.0,
        }
    }

    /// Set the maximum number of terms to expand
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    pub fn cache_key(&self) -> String {
        format!("prefix:{}:{:?}", self.prefix, self.max_expansions)
    }

    /// Indexed terms this prefix expands to, in sorted order
    pub fn expand(&self, ctx: &QueryContext) -> Result<Arc<Vec<String>>> {
        ctx.get_or_expand(&self.cache_key(), || {
            let prefix = ctx.analyzer().normalize_term(&self.prefix);
            let limit = self.max_expansions.or(ctx.max_expansions());
            Ok(ctx.index().terms_with_prefix(&prefix, limit))
        })
    }
}

impl QueryNode for PrefixQuery {
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
        // Longer prefix = fewer matches
        let base_cost = ctx.total_docs() as f64;
        base_cost / (1.0 + self.prefix.chars().count() as f64)
    }

    fn query_type(&self) -> &'static str {
        "prefix"
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}
