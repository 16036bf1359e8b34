//! Text analysis
//!
//! The [`Analyzer`] trait is the seam between raw text and index terms. Both
//! the index writer and the query parser go through the same analyzer so a
//! query term normalizes exactly like an indexed term.

mod tokenizer;

pub use tokenizer::Tokenizer;

use std::fmt::Debug;

/// Strategy for turning text into index terms
pub trait Analyzer: Send + Sync + Debug {
    /// Produce the ordered sequence of terms for `text`
    fn analyze(&self, text: &str) -> Vec<String>;

    /// Produce (term, position) pairs in order
    ///
    /// Positions count every raw token, including ones dropped by filters,
    /// so phrase matching sees the original gaps. Pairs may come in any
    /// order; the index writer sorts and dedups positions per term.
    fn analyze_with_positions(&self, text: &str) -> Vec<(String, u32)>;

    /// Normalize a raw term for multi-term queries (prefix, wildcard, fuzzy)
    ///
    /// These queries are not analyzed (a prefix must not be stemmed), they
    /// only get the same case folding as indexed terms.
    fn normalize_term(&self, term: &str) -> String {
        term.to_lowercase()
    }
}
