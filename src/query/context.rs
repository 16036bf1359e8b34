//! Query execution context
//!
//! The `QueryContext` gives query nodes access to one index generation and
//! caches the work multi-term queries repeat between matching and scoring.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use roaring::RoaringBitmap;

use crate::segment::{DocId, Index, PostingList};
use crate::tokenizer::Analyzer;
use crate::Result;

/// Query execution context for a single search
pub struct QueryContext<'a> {
    index: &'a Index,

    /// Cap on how many index terms one multi-term query may expand to
    max_expansions: Option<usize>,

    /// Expanded term lists keyed by canonical query representation
    expansion_cache: RwLock<HashMap<String, Arc<Vec<String>>>>,

    /// Document sets keyed by canonical query representation
    filter_cache: RwLock<HashMap<String, RoaringBitmap>>,

    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl<'a> QueryContext<'a> {
    pub fn new(index: &'a Index) -> Self {
        Self {
            index,
            max_expansions: None,
            expansion_cache: RwLock::new(HashMap::new()),
            filter_cache: RwLock::new(HashMap::new()),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
        }
    }

    pub fn with_max_expansions(mut self, max_expansions: Option<usize>) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    pub fn index(&self) -> &'a Index {
        self.index
    }

    pub fn analyzer(&self) -> &dyn Analyzer {
        self.index.analyzer().as_ref()
    }

    pub fn total_docs(&self) -> u32 {
        self.index.total_docs()
    }

    pub fn max_expansions(&self) -> Option<usize> {
        self.max_expansions
    }

    pub fn postings(&self, term: &str) -> Option<&'a PostingList> {
        self.index.postings(term)
    }

    pub fn doc_frequency(&self, term: &str) -> u32 {
        self.index.doc_frequency(term)
    }

    pub fn term_frequency(&self, term: &str, doc_id: DocId) -> u32 {
        self.postings(term)
            .map(|p| p.term_frequency(doc_id))
            .unwrap_or(0)
    }

    /// Documents containing any of `terms`
    pub fn union_terms<S: AsRef<str>>(&self, terms: &[S]) -> RoaringBitmap {
        let mut bitmap = RoaringBitmap::new();
        for term in terms {
            if let Some(postings) = self.postings(term.as_ref()) {
                bitmap |= postings.doc_bitmap();
            }
        }
        bitmap
    }

    /// Get or compute the index terms a multi-term query expands to
    pub fn get_or_expand<F>(&self, cache_key: &str, expand: F) -> Result<Arc<Vec<String>>>
    where
        F: FnOnce() -> Result<Vec<String>>,
    {
        if let Some(cached) = self.expansion_cache.read().get(cache_key) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(cached));
        }

        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        let terms = Arc::new(expand()?);
        self.expansion_cache
            .write()
            .insert(cache_key.to_string(), Arc::clone(&terms));
        Ok(terms)
    }

    /// Get or compute a cached document set
    pub fn get_or_cache_filter<F>(&self, cache_key: &str, compute: F) -> Result<RoaringBitmap>
    where
        F: FnOnce() -> Result<RoaringBitmap>,
    {
        if let Some(cached) = self.filter_cache.read().get(cache_key) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cached.clone());
        }

        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        let result = compute()?;
        self.filter_cache
            .write()
            .insert(cache_key.to_string(), result.clone());
        Ok(result)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }
}
