//! Phrase query - terms at consecutive positions
//!
//! Positions come from the analyzer, so a gap left by a dropped stopword
//! is part of the phrase. With `slop > 0` every term after the first may
//! sit up to `slop` positions away from where the phrase expects it.

use crate::query::ast::QueryNode;
use crate::query::context::QueryContext;
use crate::query::types::WeightedTerm;
use crate::segment::{DocId, PostingList};
use crate::Result;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhraseQuery {
    pub phrase: String,
    #[serde(default)]
    pub slop: u32,
    #[serde(default = "default_boost")]
    pub boost: f32,
}

fn default_boost() -> f32 {
    1.0
}

impl PhraseQuery {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            slop: 0,
            boost: 1.0,
        }
    }

    pub fn with_slop(mut self, slop: u32) -> Self {
        self.slop = slop;
        self
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    pub fn cache_key(&self) -> String {
        format!("phrase:{}:{}", self.phrase, self.slop)
    }
}

impl QueryNode for PhraseQuery {
    fn execute(&self, ctx: &QueryContext) -> Result<RoaringBitmap> {
        ctx.get_or_cache_filter(&self.cache_key(), || {
            let tokens = ctx.analyzer().analyze_with_positions(&self.phrase);
            Ok(match_phrase(ctx, &tokens, self.slop))
        })
    }

    fn scoring_terms(&self, ctx: &QueryContext) -> Result<Vec<WeightedTerm>> {
        Ok(ctx
            .analyzer()
            .analyze(&self.phrase)
            .into_iter()
            .map(|term| WeightedTerm::new(term, self.boost))
            .collect())
    }

    fn estimate_cost(&self, ctx: &QueryContext) -> f64 {
        let min_df = ctx
            .analyzer()
            .analyze(&self.phrase)
            .iter()
            .map(|t| ctx.doc_frequency(t))
            .min()
            .unwrap_or(0);

        let position_check_cost = if self.slop == 0 { 2.0 } else { 3.0 + self.slop as f64 };
        (min_df as f64) * position_check_cost
    }

    fn query_type(&self) -> &'static str {
        "phrase"
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}

/// Documents containing `tokens` in order, as (term, position) pairs
pub(crate) fn match_phrase(ctx: &QueryContext, tokens: &[(String, u32)], slop: u32) -> RoaringBitmap {
    let Some((_, base)) = tokens.first() else {
        return RoaringBitmap::new();
    };

    let mut lists: Vec<(&PostingList, u32)> = Vec::with_capacity(tokens.len());
    for (term, pos) in tokens {
        match ctx.postings(term) {
            Some(list) => lists.push((list, pos.saturating_sub(*base))),
            None => return RoaringBitmap::new(),
        }
    }

    // Intersect smallest lists first
    let mut by_size: Vec<&PostingList> = lists.iter().map(|(list, _)| *list).collect();
    by_size.sort_by_key(|list| list.len());
    let mut candidates = by_size[0].doc_bitmap();
    for list in &by_size[1..] {
        candidates &= list.doc_bitmap();
        if candidates.is_empty() {
            return candidates;
        }
    }

    let mut matched = RoaringBitmap::new();
    for doc in candidates.iter() {
        if positions_match(&lists, DocId(doc), slop) {
            matched.insert(doc);
        }
    }
    matched
}

fn positions_match(lists: &[(&PostingList, u32)], doc_id: DocId, slop: u32) -> bool {
    let Some(first) = lists.first().and_then(|(list, _)| list.get(doc_id)) else {
        return false;
    };
    let slop = slop as i64;

    first.positions.iter().any(|&start| {
        lists[1..].iter().all(|(list, offset)| {
            let expected = start as i64 + *offset as i64;
            list.get(doc_id)
                .map(|p| {
                    p.positions
                        .iter()
                        .any(|&pos| (pos as i64 - expected).abs() <= slop)
                })
                .unwrap_or(false)
        })
    })
}
