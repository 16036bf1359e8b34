//! Concrete query node implementations
//!
//! This module provides implementations of the `QueryNode` trait for
//! various query types.

mod bool_query;
mod fuzzy_query;
mod phrase_query;
mod prefix_query;
mod term_query;
mod wildcard_query;

pub use bool_query::BoolQuery;
pub use fuzzy_query::{levenshtein_distance, FuzzyQuery};
pub use phrase_query::PhraseQuery;
pub use prefix_query::PrefixQuery;
pub use term_query::TermQuery;
pub use wildcard_query::WildcardQuery;
