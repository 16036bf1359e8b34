//! Core types for the query system

use serde::{Deserialize, Serialize};

use crate::error::LexisError;
use crate::Result;

/// Operator applied between adjacent query-string clauses with no
/// explicit operator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOperator {
    /// All terms must match (AND)
    And,
    /// At least one term must match (OR)
    #[default]
    Or,
}

/// How far a fuzzy term may drift from the query term
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fuzziness {
    /// Fixed maximum edit distance
    Edits(u32),
    /// Minimum similarity in [0, 1]
    ///
    /// A candidate matches when
    /// `1 - distance / min(len(query), len(candidate)) > similarity`,
    /// lengths counted in characters. A similarity of exactly 1 matches the
    /// term itself.
    Similarity(f32),
}

impl Fuzziness {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Fuzziness::Edits(_) => Ok(()),
            Fuzziness::Similarity(s) if (0.0..=1.0).contains(&s) => Ok(()),
            Fuzziness::Similarity(s) => Err(LexisError::InvalidRequest(format!(
                "fuzzy similarity must be within [0, 1], got {}",
                s
            ))),
        }
    }

    /// Whether only the exact term can match
    pub fn is_exact(&self) -> bool {
        match *self {
            Fuzziness::Edits(n) => n == 0,
            Fuzziness::Similarity(s) => s >= 1.0,
        }
    }

    /// Whether a candidate at `distance` edits is close enough
    pub fn accepts(&self, distance: usize, query_len: usize, candidate_len: usize) -> bool {
        match *self {
            Fuzziness::Edits(n) => distance <= n as usize,
            Fuzziness::Similarity(s) => {
                let shorter = query_len.min(candidate_len);
                if shorter == 0 {
                    return distance == 0;
                }
                // Strict, computed in f32: a similarity equal to `s` is rejected
                1.0 - distance as f32 / shorter as f32 > s
            }
        }
    }

    /// Largest edit distance allowed between terms of these lengths
    pub fn max_distance(&self, query_len: usize, candidate_len: usize) -> usize {
        match *self {
            Fuzziness::Edits(n) => n as usize,
            Fuzziness::Similarity(s) => {
                let shorter = query_len.min(candidate_len);
                let mut budget = ((1.0 - s) * shorter as f32).ceil().max(0.0) as usize;
                while budget > 0 && !self.accepts(budget, query_len, candidate_len) {
                    budget -= 1;
                }
                budget
            }
        }
    }

    /// Upper bound of [`Fuzziness::max_distance`] over all candidates
    pub fn max_distance_bound(&self, query_len: usize) -> usize {
        self.max_distance(query_len, query_len)
    }
}

/// A positive term contributing to the score of matched documents
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedTerm {
    pub term: String,
    pub boost: f32,
}

impl WeightedTerm {
    pub fn new(term: impl Into<String>, boost: f32) -> Self {
        Self {
            term: term.into(),
            boost,
        }
    }
}

/// Query execution statistics
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct QueryStats {
    /// Number of documents matched
    pub docs_matched: u64,
    /// Number of distinct index terms that contributed to scoring
    pub terms_scored: u64,
    /// Number of expansion cache hits
    pub expansion_cache_hits: u64,
    /// Number of expansion cache misses
    pub expansion_cache_misses: u64,
    /// Execution time in microseconds
    pub execution_time_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_distance() {
        let fuzzy = Fuzziness::Similarity(0.2);
        // 4 < 0.8 * 6
        assert_eq!(fuzzy.max_distance(6, 6), 4);
        // shorter candidate caps the budget: 3 < 0.8 * 4
        assert_eq!(fuzzy.max_distance(6, 4), 3);
        assert_eq!(fuzzy.max_distance(1, 8), 0);
    }

    #[test]
    fn test_similarity_boundary_is_exclusive() {
        // 1 - 4/5 is exactly 0.2
        let fuzzy = Fuzziness::Similarity(0.2);
        assert!(!fuzzy.accepts(4, 5, 5));
        assert!(fuzzy.accepts(3, 5, 5));
        assert_eq!(fuzzy.max_distance(5, 5), 3);

        // 1 - 1/5 is exactly 0.8
        let strict = Fuzziness::Similarity(0.8);
        assert!(!strict.accepts(1, 5, 5));
        assert_eq!(strict.max_distance(5, 5), 0);

        // 1 - 2/4 is exactly 0.5
        assert_eq!(Fuzziness::Similarity(0.5).max_distance(4, 9), 1);
        assert!(Fuzziness::Edits(2).accepts(2, 1, 1));
    }

    #[test]
    fn test_edits_distance() {
        let fuzzy = Fuzziness::Edits(2);
        assert_eq!(fuzzy.max_distance(3, 10), 2);
        assert!(!fuzzy.is_exact());
        assert!(Fuzziness::Edits(0).is_exact());
        assert!(Fuzziness::Similarity(1.0).is_exact());
    }

    #[test]
    fn test_validate() {
        assert!(Fuzziness::Similarity(0.5).validate().is_ok());
        assert!(Fuzziness::Similarity(-0.1).validate().is_err());
        assert!(Fuzziness::Similarity(1.1).validate().is_err());
    }

    #[test]
    fn test_match_operator_serde() {
        let json = serde_json::to_string(&MatchOperator::And).unwrap();
        assert_eq!(json, "\"and\"");
        assert_eq!(MatchOperator::default(), MatchOperator::Or);
    }
}
