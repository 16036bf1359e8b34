//! Searcher façade over one index generation
//!
//! [`IndexSearcher`] exposes the four fixed entry points used by callers
//! (`prefix_search`, `wildcard_search`, `query_search`, `fuzzy_search`),
//! each capped at the configured result limit, plus generic [`Query`]
//! execution and an `explain` diagnostic.
//!
//! # Example
//!
//! ```rust
//! use lexis::{IndexSearcher, IndexWriter};
//!
//! let index = IndexWriter::default()
//!     .build(["Muscle pain", "Miscle ache", "Schwann cell", "Epidemic"])
//!     .unwrap();
//! let searcher = IndexSearcher::new(&index);
//!
//! let hits = searcher.fuzzy_search("miscle").unwrap();
//! assert_eq!(hits.len(), 2);
//! ```

use std::time::Instant;

use tracing::{debug, warn};

use crate::config::IndexSettings;
use crate::models::{Explanation, ScoredResult, SearchResponse, TermExplanation};
use crate::query::{Fuzziness, Query, QueryContext, QueryExecutor};
use crate::scoring::Scorer;
use crate::segment::Index;
use crate::Result;

/// Read-only searcher borrowing one immutable [`Index`]
///
/// Cheap to create; each search gets a fresh [`QueryContext`], so nothing
/// computed for one search leaks into the next.
#[derive(Clone, Debug)]
pub struct IndexSearcher<'a> {
    index: &'a Index,
    settings: IndexSettings,
}

impl<'a> IndexSearcher<'a> {
    pub fn new(index: &'a Index) -> Self {
        Self::with_settings(index, IndexSettings::default())
    }

    /// Searcher with custom settings
    ///
    /// Queries are always analyzed with the index's own analyzer. The
    /// tokenizer part of `settings` only takes effect when the index is
    /// built, see [`crate::IndexWriter::from_settings`].
    pub fn with_settings(index: &'a Index, settings: IndexSettings) -> Self {
        if let Some(built_with) = index.tokenizer_config() {
            if built_with != &settings.tokenizer_config {
                warn!(
                    generation = index.generation(),
                    "searcher settings name a tokenizer config the index was not built with"
                );
            }
        }
        Self { index, settings }
    }

    pub fn index(&self) -> &'a Index {
        self.index
    }

    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    /// Documents containing a term that starts with `prefix`
    pub fn prefix_search(&self, prefix: &str) -> Result<Vec<ScoredResult>> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }
        self.search(&Query::prefix(prefix))
    }

    /// Wildcard search with an implicit trailing `*`
    ///
    /// `epid` behaves as `epid*`; `m?sc` as `m?sc*`.
    pub fn wildcard_search(&self, text: &str) -> Result<Vec<ScoredResult>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        self.search(&Query::wildcard(format!("{}*", text)))
    }

    /// Parse and run a Lucene-style query string
    pub fn query_search(&self, query_string: &str) -> Result<Vec<ScoredResult>> {
        let query = Query::parse_with_settings(query_string, &self.settings).map_err(|e| {
            warn!(query = query_string, error = %e, "rejected query string");
            e
        })?;
        self.search(&query)
    }

    /// Approximate term match at the configured similarity
    pub fn fuzzy_search(&self, term: &str) -> Result<Vec<ScoredResult>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let fuzziness = Fuzziness::Similarity(self.settings.fuzzy_similarity);
        self.search(&Query::fuzzy(term, fuzziness))
    }

    /// Run a query with the configured result limit
    pub fn search(&self, query: &Query) -> Result<Vec<ScoredResult>> {
        self.search_with_limit(query, self.settings.search_limit)
    }

    pub fn search_with_limit(&self, query: &Query, limit: usize) -> Result<Vec<ScoredResult>> {
        Ok(self.search_response(query, limit)?.results)
    }

    /// Run a query and keep the hit count and execution statistics
    pub fn search_response(&self, query: &Query, limit: usize) -> Result<SearchResponse> {
        let start = Instant::now();
        let ctx = self.context();
        let result = QueryExecutor::execute(query.as_node(), &ctx, limit)?;

        debug!(
            generation = self.index.generation(),
            total_hits = result.total_hits,
            limit,
            "search complete"
        );

        Ok(SearchResponse {
            results: result.hits,
            total_hits: result.total_hits,
            took_us: start.elapsed().as_micros() as u64,
            stats: result.stats,
        })
    }

    /// Expanded terms of `query` with their weights
    pub fn explain(&self, query: &Query) -> Result<Explanation> {
        let ctx = self.context();
        let node = query.as_node();

        let matched_docs = node.execute(&ctx)?.len();
        let scorer = Scorer::new(&ctx, node.scoring_terms(&ctx)?);
        let terms = scorer
            .weights()
            .iter()
            .map(|w| TermExplanation {
                term: w.term.clone(),
                doc_frequency: w.doc_frequency,
                idf: w.idf,
                boost: w.boost,
            })
            .collect();

        Ok(Explanation {
            query_type: node.query_type().to_string(),
            total_docs: self.index.total_docs(),
            matched_docs,
            terms,
        })
    }

    fn context(&self) -> QueryContext<'a> {
        QueryContext::new(self.index).with_max_expansions(self.settings.max_expansions)
    }
}
