//! Abstract Syntax Tree for query representation
//!
//! Every query kind implements [`QueryNode`]. Matching is set based: a node
//! produces the bitmap of matching documents. Scoring is separate: a node
//! reports the positive index terms it expanded to, and the scorer sums
//! their tf-idf over each matched document.

use std::fmt::Debug;

use roaring::RoaringBitmap;

use super::context::QueryContext;
use super::nodes::{FuzzyQuery, PhraseQuery, PrefixQuery, TermQuery, WildcardQuery};
use super::query_string::QueryStringParser;
use super::types::{Fuzziness, MatchOperator, WeightedTerm};
use crate::config::IndexSettings;
use crate::Result;

/// Core trait for all query nodes in the AST
pub trait QueryNode: Send + Sync + Debug {
    /// Execute the query and return matching document IDs as a bitmap
    fn execute(&self, ctx: &QueryContext) -> Result<RoaringBitmap>;

    /// The positive index terms this query scores with, boost applied
    ///
    /// Prohibited clauses contribute nothing.
    fn scoring_terms(&self, ctx: &QueryContext) -> Result<Vec<WeightedTerm>>;

    /// Estimate the execution cost of this query
    ///
    /// Used to order conjunctions so the most selective clause runs first.
    fn estimate_cost(&self, ctx: &QueryContext) -> f64;

    /// Get the query type name for debugging and logging
    fn query_type(&self) -> &'static str;

    /// Get the boost factor for this query
    fn boost(&self) -> f32 {
        1.0
    }

    /// Clone this query node into a boxed trait object
    fn clone_box(&self) -> Box<dyn QueryNode>;
}

impl Clone for Box<dyn QueryNode> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A query that matches nothing
#[derive(Clone, Debug, Default)]
pub struct MatchNoneQuery;

impl QueryNode for MatchNoneQuery {
    fn execute(&self, _ctx: &QueryContext) -> Result<RoaringBitmap> {
        Ok(RoaringBitmap::new())
    }

    fn scoring_terms(&self, _ctx: &QueryContext) -> Result<Vec<WeightedTerm>> {
        Ok(Vec::new())
    }

    fn estimate_cost(&self, _ctx: &QueryContext) -> f64 {
        0.0
    }

    fn query_type(&self) -> &'static str {
        "match_none"
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}

/// A query-string query after parsing
#[derive(Clone, Debug)]
pub struct ParsedQuery {
    /// The text the query was parsed from
    pub source: String,
    root: Box<dyn QueryNode>,
}

impl ParsedQuery {
    /// Parse with the default operator and fuzzy similarity
    pub fn parse(input: &str) -> Result<Self> {
        Self::parse_with_settings(input, &IndexSettings::default())
    }

    pub fn parse_with_settings(input: &str, settings: &IndexSettings) -> Result<Self> {
        let root = QueryStringParser::new(input)?
            .with_default_operator(settings.default_operator)
            .with_fuzzy_similarity(settings.query_fuzzy_similarity)
            .parse()?;
        Ok(Self {
            source: input.to_string(),
            root: root.unwrap_or_else(|| Box::new(MatchNoneQuery)),
        })
    }

    pub fn root(&self) -> &dyn QueryNode {
        self.root.as_ref()
    }
}

/// A query against the index
#[derive(Clone, Debug)]
pub enum Query {
    /// Analyzed text; several tokens match as a phrase
    Term(TermQuery),
    /// Every term starting with a prefix
    Prefix(PrefixQuery),
    /// Terms matching a `*`/`?` pattern
    Wildcard(WildcardQuery),
    /// Terms within an edit-distance budget
    Fuzzy(FuzzyQuery),
    /// Adjacent terms, optionally within a slop
    Phrase(PhraseQuery),
    /// Boolean query string
    Parsed(ParsedQuery),
}

impl Query {
    pub fn term(text: impl Into<String>) -> Self {
        Query::Term(TermQuery::new(text))
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Query::Prefix(PrefixQuery::new(prefix))
    }

    pub fn wildcard(pattern: impl Into<String>) -> Self {
        Query::Wildcard(WildcardQuery::new(pattern))
    }

    pub fn fuzzy(term: impl Into<String>, fuzziness: Fuzziness) -> Self {
        Query::Fuzzy(FuzzyQuery::new(term, fuzziness))
    }

    pub fn phrase(text: impl Into<String>) -> Self {
        Query::Phrase(PhraseQuery::new(text))
    }

    /// Parse a query string with default settings
    pub fn parse(input: &str) -> Result<Self> {
        ParsedQuery::parse(input).map(Query::Parsed)
    }

    /// Parse a query string honoring the operator and fuzzy settings
    pub fn parse_with_settings(input: &str, settings: &IndexSettings) -> Result<Self> {
        ParsedQuery::parse_with_settings(input, settings).map(Query::Parsed)
    }

    /// Parse a query string with an explicit default operator
    pub fn parse_with_operator(input: &str, operator: MatchOperator) -> Result<Self> {
        let settings = IndexSettings::default().with_default_operator(operator);
        Self::parse_with_settings(input, &settings)
    }

    /// The executable node behind this query
    pub fn as_node(&self) -> &dyn QueryNode {
        match self {
            Query::Term(q) => q,
            Query::Prefix(q) => q,
            Query::Wildcard(q) => q,
            Query::Fuzzy(q) => q,
            Query::Phrase(q) => q,
            Query::Parsed(q) => q.root(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::IndexWriter;

    #[test]
    fn test_match_none() {
        let index = IndexWriter::default().build(["Epidemic"]).unwrap();
        let ctx = QueryContext::new(&index);

        let node = MatchNoneQuery;
        assert!(node.execute(&ctx).unwrap().is_empty());
        assert!(node.scoring_terms(&ctx).unwrap().is_empty());
        assert_eq!(node.query_type(), "match_none");
    }

    #[test]
    fn test_empty_query_string_parses_to_match_none() {
        let query = Query::parse("   ").unwrap();
        assert_eq!(query.as_node().query_type(), "match_none");
    }

    #[test]
    fn test_query_constructors() {
        assert_eq!(Query::term("pain").as_node().query_type(), "term");
        assert_eq!(Query::prefix("pa").as_node().query_type(), "prefix");
        assert_eq!(Query::wildcard("p*n").as_node().query_type(), "wildcard");
        assert_eq!(
            Query::fuzzy("pain", Fuzziness::Edits(1)).as_node().query_type(),
            "fuzzy"
        );
        assert_eq!(Query::phrase("muscle pain").as_node().query_type(), "phrase");
        assert_eq!(Query::parse("a AND b").unwrap().as_node().query_type(), "bool");
    }

    #[test]
    fn test_parse_error_propagates() {
        assert!(Query::parse("muscle AND").is_err());
    }

    #[test]
    fn test_boxed_node_clone() {
        let node: Box<dyn QueryNode> = Box::new(TermQuery::new("pain").with_boost(2.0));
        let cloned = node.clone();
        assert_eq!(cloned.boost(), 2.0);
    }
}
