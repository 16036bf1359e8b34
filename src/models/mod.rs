pub mod search;

pub use search::{sort_by_stored_value, Explanation, ScoredResult, SearchResponse, TermExplanation};
