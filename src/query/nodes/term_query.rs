//! Term query - analyzed text matched against the inverted index

use crate::query::ast::QueryNode;
use crate::query::context::QueryContext;
use crate::query::types::WeightedTerm;
use crate::Result;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};

use super::phrase_query::match_phrase;

/// Query that matches documents containing a term
///
/// The text goes through the index analyzer first. A single token is a
/// plain posting lookup; text that analyzes into several tokens (for
/// example `schwann-cell`) must match them as a phrase, and text that
/// analyzes to nothing matches nothing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TermQuery {
    /// Raw term text as written by the user
    pub text: String,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
}

fn default_boost() -> f32 {
    1.0
}

impl TermQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            boost: 1.0,
        }
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    pub fn cache_key(&self) -> String {
        format!("term:{}", self.text)
    }
}

impl QueryNode for TermQuery {
    fn execute(&self, ctx: &QueryContext) -> Result<RoaringBitmap> {
        ctx.get_or_cache_filter(&self.cache_key(), || {
            let tokens = ctx.analyzer().analyze_with_positions(&self.text);
            Ok(match tokens.as_slice() {
                [] => RoaringBitmap::new(),
                [(term, _)] => ctx
                    .postings(term)
                    .map(|p| p.doc_bitmap())
                    .unwrap_or_default(),
                _ => match_phrase(ctx, &tokens, 0),
            })
        })
    }

    fn scoring_terms(&self, ctx: &QueryContext) -> Result<Vec<WeightedTerm>> {
        Ok(ctx
            .analyzer()
            .analyze(&self.text)
            .into_iter()
            .map(|term| WeightedTerm::new(term, self.boost))
            .collect())
    }

    fn estimate_cost(&self, ctx: &QueryContext) -> f64 {
        ctx.analyzer()
            .analyze(&self.text)
            .iter()
            .map(|t| ctx.doc_frequency(t))
            .min()
            .unwrap_or(0) as f64
    }

    fn query_type(&self) -> &'static str {
        "term"
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{Index, IndexWriter};

    fn index() -> Index {
        IndexWriter::default()
            .build(["Muscle pain", "Miscle ache", "Schwann cell", "cell schwann"])
            .unwrap()
    }

    #[test]
    fn test_term_query_creation() {
        let query = TermQuery::new("Muscle").with_boost(2.0);
        assert_eq!(query.text, "Muscle");
        assert_eq!(query.boost, 2.0);
        assert_eq!(query.cache_key(), "term:Muscle");
    }

    #[test]
    fn test_term_is_analyzed() {
        let index = index();
        let ctx = QueryContext::new(&index);

        let bitmap = TermQuery::new("MUSCLE").execute(&ctx).unwrap();
        assert_eq!(bitmap.iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_multi_token_term_matches_as_phrase() {
        let index = index();
        let ctx = QueryContext::new(&index);

        let bitmap = TermQuery::new("schwann-cell").execute(&ctx).unwrap();
        assert_eq!(bitmap.iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_symbol_only_term_matches_nothing() {
        let index = index();
        let ctx = QueryContext::new(&index);

        assert!(TermQuery::new("--").execute(&ctx).unwrap().is_empty());
        assert!(TermQuery::new("--").scoring_terms(&ctx).unwrap().is_empty());
    }

    #[test]
    fn test_scoring_terms_carry_boost() {
        let index = index();
        let ctx = QueryContext::new(&index);

        let terms = TermQuery::new("Schwann-Cell")
            .with_boost(3.0)
            .scoring_terms(&ctx)
            .unwrap();
        assert_eq!(
            terms,
            vec![WeightedTerm::new("schwann", 3.0), WeightedTerm::new("cell", 3.0)]
        );
    }

    #[test]
    fn test_estimate_cost() {
        let index = index();
        let ctx = QueryContext::new(&index);
        assert_eq!(TermQuery::new("cell").estimate_cost(&ctx), 2.0);
        assert_eq!(TermQuery::new("absent").estimate_cost(&ctx), 0.0);
    }
}
