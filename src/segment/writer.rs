//! Index writer: turns a sequence of lines into an immutable [`Index`]
//!
//! A build is all-or-nothing. Every input line is consumed before the index
//! is assembled, and the first failure aborts the whole build.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::convert::Infallible;
use std::fmt::Display;
use std::io::BufRead;
use std::sync::Arc;

use tracing::{debug, info};

use super::index::Index;
use super::postings::PostingList;
use super::statistics::IndexStatistics;
use super::store::DocumentStore;
use super::types::Posting;
use crate::config::{IndexSettings, TokenizerConfig};
use crate::error::LexisError;
use crate::tokenizer::{Analyzer, Tokenizer};
use crate::Result;

/// Counters reported after a build
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub lines_read: usize,
    pub documents: usize,
    pub duplicates: usize,
    pub blank_lines: usize,
    pub terms: usize,
}

#[derive(Clone)]
pub struct IndexWriter {
    analyzer: Arc<dyn Analyzer>,
    tokenizer_config: Option<TokenizerConfig>,
    generation: u64,
}

impl IndexWriter {
    /// Writer using the standard tokenizer built from `config`
    pub fn new(config: &TokenizerConfig) -> Self {
        Self {
            analyzer: Arc::new(Tokenizer::new(config)),
            tokenizer_config: Some(config.clone()),
            generation: 1,
        }
    }

    /// Writer using the tokenizer configured in `settings`
    pub fn from_settings(settings: &IndexSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::new(&settings.tokenizer_config))
    }

    /// Writer using a custom analyzer
    ///
    /// Snapshots of indexes built this way must be reopened with
    /// [`Index::open_with_analyzer`].
    pub fn with_analyzer(analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            analyzer,
            tokenizer_config: None,
            generation: 1,
        }
    }

    /// Generation stamped on built indexes
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    pub fn tokenizer_config(&self) -> Option<&TokenizerConfig> {
        self.tokenizer_config.as_ref()
    }

    /// Build an index over in-memory lines
    pub fn build<I, S>(&self, lines: I) -> Result<Index>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.build_from_lines(lines.into_iter().map(Ok::<S, Infallible>))
    }

    /// Build an index from a line source that may fail mid-stream
    pub fn build_from_lines<I, S, E>(&self, lines: I) -> Result<Index>
    where
        I: IntoIterator<Item = std::result::Result<S, E>>,
        S: AsRef<str>,
        E: Display,
    {
        self.build_with_stats(lines).map(|(index, _)| index)
    }

    /// Build an index from a reader, one document per line
    pub fn build_from_reader<R: BufRead>(&self, reader: R) -> Result<Index> {
        self.build_from_lines(reader.lines())
    }

    /// Build an index and report what was skipped
    pub fn build_with_stats<I, S, E>(&self, lines: I) -> Result<(Index, BuildStats)>
    where
        I: IntoIterator<Item = std::result::Result<S, E>>,
        S: AsRef<str>,
        E: Display,
    {
        let mut stats = BuildStats::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut documents = DocumentStore::new();
        let mut doc_stats = IndexStatistics::new();
        let mut inverted: BTreeMap<String, PostingList> = BTreeMap::new();

        for (line_no, line) in lines.into_iter().enumerate() {
            let line = line.map_err(|e| {
                LexisError::index_build(format!("failed to read line {}: {}", line_no + 1, e))
            })?;
            let text = line.as_ref();
            stats.lines_read += 1;

            if text.trim().is_empty() {
                stats.blank_lines += 1;
                continue;
            }

            // Case-folded duplicates keep the first occurrence
            if !seen.insert(text.to_lowercase()) {
                stats.duplicates += 1;
                debug!(line = line_no + 1, "skipping duplicate document");
                continue;
            }

            let tokens = self.analyzer.analyze_with_positions(text);

            let doc_id = documents.push(text.to_string()).ok_or_else(|| {
                LexisError::index_build("document count exceeds the DocId range")
            })?;
            doc_stats.add_document();

            let mut positions: HashMap<String, Vec<u32>> = HashMap::new();
            for (term, pos) in tokens {
                positions.entry(term).or_default().push(pos);
            }
            for (term, mut term_positions) in positions {
                // Position deltas are encoded unsigned
                term_positions.sort_unstable();
                term_positions.dedup();
                inverted
                    .entry(term)
                    .or_default()
                    .push(Posting::with_positions(doc_id, term_positions))
                    .map_err(|e| LexisError::index_build(e.to_string()))?;
            }
        }

        stats.documents = documents.len();
        stats.terms = inverted.len();

        let index = Index::from_inverted(
            self.generation,
            Arc::clone(&self.analyzer),
            self.tokenizer_config.clone(),
            inverted,
            documents,
            doc_stats,
        )?;

        info!(
            generation = self.generation,
            documents = stats.documents,
            duplicates = stats.duplicates,
            blank_lines = stats.blank_lines,
            terms = stats.terms,
            "index build complete"
        );

        Ok((index, stats))
    }
}

impl Default for IndexWriter {
    fn default() -> Self {
        Self::new(&TokenizerConfig::default())
    }
}

impl std::fmt::Debug for IndexWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexWriter")
            .field("analyzer", &self.analyzer)
            .field("generation", &self.generation)
            .finish()
    }
}
