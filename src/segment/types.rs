//! Core types for the inverted index

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense document identifier within one index generation
///
/// Assigned monotonically from 0 in insertion order and never reused
/// within a generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u32);

impl DocId {
    pub const MAX: DocId = DocId(u32::MAX);

    pub fn new(n: u32) -> Self {
        Self(n)
    }

    /// Convert a store position into a DocId, failing past `u32::MAX`
    pub fn from_usize(n: usize) -> Option<Self> {
        u32::try_from(n).ok().map(Self)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc_{}", self.0)
    }
}

/// A single posting entry within a posting list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Document containing the term
    pub doc_id: DocId,
    /// Term frequency in this document
    pub term_frequency: u32,
    /// Token positions of the term in this document, ascending
    pub positions: Vec<u32>,
}

impl Posting {
    pub fn new(doc_id: DocId, term_frequency: u32) -> Self {
        Self {
            doc_id,
            term_frequency,
            positions: Vec::new(),
        }
    }

    pub fn with_positions(doc_id: DocId, positions: Vec<u32>) -> Self {
        Self {
            doc_id,
            term_frequency: positions.len() as u32,
            positions,
        }
    }
}

/// Per-term statistics used for scoring
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermStats {
    /// Number of documents containing this term
    pub doc_frequency: u32,
    /// Total occurrences of this term across all documents
    pub total_term_frequency: u64,
}
