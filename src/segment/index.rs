//! Immutable inverted index
//!
//! An [`Index`] is one complete generation: term dictionary, posting lists,
//! stored documents and statistics. It is never mutated after construction,
//! so any number of threads can search it through an `Arc<Index>`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use roaring::RoaringBitmap;

use super::postings::PostingList;
use super::statistics::IndexStatistics;
use super::store::DocumentStore;
use super::term_dict::{TermDictionary, TermDictionaryBuilder};
use super::types::{DocId, TermStats};
use crate::config::TokenizerConfig;
use crate::error::LexisError;
use crate::tokenizer::{Analyzer, Tokenizer};
use crate::Result;

pub struct Index {
    generation: u64,
    analyzer: Arc<dyn Analyzer>,
    /// Present when the analyzer is a [`Tokenizer`] that can be rebuilt
    /// from configuration alone
    tokenizer_config: Option<TokenizerConfig>,
    terms: TermDictionary,
    /// Posting lists indexed by term ordinal
    postings: Vec<PostingList>,
    documents: DocumentStore,
    stats: IndexStatistics,
}

impl Index {
    /// An index with no documents
    pub fn empty(analyzer: Arc<dyn Analyzer>, tokenizer_config: Option<TokenizerConfig>) -> Result<Self> {
        let terms = TermDictionary::empty()
            .map_err(|e| LexisError::Internal(format!("failed to build empty FST: {}", e)))?;
        Ok(Self {
            generation: 0,
            analyzer,
            tokenizer_config,
            terms,
            postings: Vec::new(),
            documents: DocumentStore::new(),
            stats: IndexStatistics::new(),
        })
    }

    /// An empty index using the default tokenizer
    pub fn empty_default() -> Result<Self> {
        let config = TokenizerConfig::default();
        Self::empty(Arc::new(Tokenizer::new(&config)), Some(config))
    }

    /// Assemble an index from a sorted term map
    pub(crate) fn from_inverted(
        generation: u64,
        analyzer: Arc<dyn Analyzer>,
        tokenizer_config: Option<TokenizerConfig>,
        inverted: BTreeMap<String, PostingList>,
        documents: DocumentStore,
        stats: IndexStatistics,
    ) -> Result<Self> {
        let mut builder = TermDictionaryBuilder::with_capacity(inverted.len());
        let mut postings = Vec::with_capacity(inverted.len());
        for (ordinal, (term, list)) in inverted.into_iter().enumerate() {
            builder.add(term, ordinal);
            postings.push(list);
        }
        let terms = builder
            .build()
            .map_err(|e| LexisError::index_build(format!("failed to build term dictionary: {}", e)))?;

        Self::from_parts(generation, analyzer, tokenizer_config, terms, postings, documents, stats)
    }

    /// Assemble an index from already-built parts, checking they agree
    pub(crate) fn from_parts(
        generation: u64,
        analyzer: Arc<dyn Analyzer>,
        tokenizer_config: Option<TokenizerConfig>,
        terms: TermDictionary,
        postings: Vec<PostingList>,
        documents: DocumentStore,
        stats: IndexStatistics,
    ) -> Result<Self> {
        if terms.len() != postings.len() {
            return Err(LexisError::Internal(format!(
                "term dictionary has {} terms but {} posting lists",
                terms.len(),
                postings.len()
            )));
        }
        if terms.max_ordinal().is_some_and(|max| max >= postings.len()) {
            return Err(LexisError::Internal(
                "term ordinal out of range of posting lists".to_string(),
            ));
        }
        if documents.len() != stats.doc_count as usize {
            return Err(LexisError::Internal(format!(
                "{} stored documents but statistics count {}",
                documents.len(),
                stats.doc_count
            )));
        }
        let doc_count = stats.doc_count;
        if postings
            .iter()
            .filter_map(|list| list.iter().last())
            .any(|p| p.doc_id.as_u32() >= doc_count)
        {
            return Err(LexisError::Internal(
                "posting references a document outside the store".to_string(),
            ));
        }

        Ok(Self {
            generation,
            analyzer,
            tokenizer_config,
            terms,
            postings,
            documents,
            stats,
        })
    }

    /// Same index stamped with another generation
    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// Build generation of this index, 0 for the initial empty index
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    pub fn tokenizer_config(&self) -> Option<&TokenizerConfig> {
        self.tokenizer_config.as_ref()
    }

    /// Number of documents, N in the idf formula
    pub fn total_docs(&self) -> u32 {
        self.stats.doc_count
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of distinct terms
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> &TermDictionary {
        &self.terms
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub fn statistics(&self) -> &IndexStatistics {
        &self.stats
    }

    /// Stored original text of a document
    pub fn stored(&self, doc_id: DocId) -> Option<&str> {
        self.documents.get(doc_id)
    }

    /// Posting list of an exact term
    pub fn postings(&self, term: &str) -> Option<&PostingList> {
        self.terms
            .get(term)
            .and_then(|ord| self.postings.get(ord))
    }

    pub(crate) fn posting_lists(&self) -> &[PostingList] {
        &self.postings
    }

    /// Number of documents containing `term`, 0 when absent
    pub fn doc_frequency(&self, term: &str) -> u32 {
        self.postings(term).map(|p| p.doc_frequency()).unwrap_or(0)
    }

    pub fn term_stats(&self, term: &str) -> Option<TermStats> {
        self.postings(term).map(PostingList::stats)
    }

    /// Documents containing `term`
    pub fn term_bitmap(&self, term: &str) -> RoaringBitmap {
        self.postings(term)
            .map(PostingList::doc_bitmap)
            .unwrap_or_default()
    }

    /// Every indexed term beginning with `prefix`, in sorted order
    pub fn terms_with_prefix(&self, prefix: &str, limit: Option<usize>) -> Vec<String> {
        self.terms
            .prefix_search(prefix, limit)
            .into_iter()
            .map(|(term, _)| term)
            .collect()
    }

    /// Bitmap of every document
    pub fn all_docs(&self) -> RoaringBitmap {
        let mut bitmap = RoaringBitmap::new();
        if self.stats.doc_count > 0 {
            bitmap.insert_range(0..self.stats.doc_count);
        }
        bitmap
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("generation", &self.generation)
            .field("documents", &self.documents.len())
            .field("terms", &self.terms.len())
            .field("analyzer", &self.analyzer)
            .finish()
    }
}
