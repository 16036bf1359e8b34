//! Query engine
//!
//! Queries are trees of [`QueryNode`]s evaluated as set operations over
//! roaring bitmaps of DocIds:
//! - Term and phrase queries (analyzed text)
//! - Prefix, wildcard and fuzzy queries (expanded against the term dictionary)
//! - Boolean queries (must / should / must_not)
//! - Lucene-style query strings, parsed by [`query_string`]
//!
//! # Example
//!
//! ```rust
//! use lexis::query::{Query, QueryContext, QueryExecutor};
//! use lexis::IndexWriter;
//!
//! let index = IndexWriter::default().build(["Muscle pain", "Schwann cell"]).unwrap();
//! let ctx = QueryContext::new(&index);
//!
//! let query = Query::parse("muscle OR cell").unwrap();
//! let result = QueryExecutor::execute(query.as_node(), &ctx, 10).unwrap();
//! assert_eq!(result.total_hits, 2);
//! ```

pub mod ast;
pub mod context;
pub mod executor;
pub mod nodes;
pub mod query_string;
pub mod types;

pub use ast::{MatchNoneQuery, ParsedQuery, Query, QueryNode};
pub use context::QueryContext;
pub use executor::{QueryExecutor, QueryResult};
pub use nodes::{BoolQuery, FuzzyQuery, PhraseQuery, PrefixQuery, TermQuery, WildcardQuery};
pub use query_string::QueryStringParser;
pub use types::*;
