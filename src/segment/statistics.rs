use serde::{Deserialize, Serialize};

use super::types::DocId;

/// Collection-level statistics for one index generation
///
/// TF-IDF only needs `N`, the number of documents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStatistics {
    /// Total number of documents
    pub doc_count: u32,
}

impl IndexStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics for an index holding `doc_count` documents
    pub fn with_doc_count(doc_count: u32) -> Self {
        Self { doc_count }
    }

    /// Record one more document and return its id
    pub fn add_document(&mut self) -> DocId {
        let doc_id = DocId::new(self.doc_count);
        self.doc_count += 1;
        doc_id
    }
}
