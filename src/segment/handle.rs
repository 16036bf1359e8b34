//! Shared handle to the current index generation
//!
//! Readers take an `Arc<Index>` snapshot and keep searching it for as long
//! as they hold it. A rebuild constructs the next generation off to the side
//! and publishes it with a single atomic swap, so readers see either the old
//! index or the new one and never a partial build.

use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{info, warn};

use super::index::Index;
use super::writer::IndexWriter;
use crate::config::IndexSettings;
use crate::error::LexisError;
use crate::Result;

pub struct IndexHandle {
    current: ArcSwap<Index>,
    writer: IndexWriter,
    /// Serializes rebuilds so generations stay strictly increasing
    rebuild_lock: Mutex<()>,
}

impl IndexHandle {
    /// Start with an empty generation-0 index
    pub fn new(writer: IndexWriter) -> Result<Self> {
        let empty = Index::empty(
            Arc::clone(writer.analyzer()),
            writer.tokenizer_config().cloned(),
        )?;
        Ok(Self::from_index(writer, empty))
    }

    /// Start empty, building every generation with the tokenizer in `settings`
    pub fn from_settings(settings: &IndexSettings) -> Result<Self> {
        Self::new(IndexWriter::from_settings(settings)?)
    }

    /// Start from an existing index, e.g. one reopened from a snapshot
    pub fn from_index(writer: IndexWriter, index: Index) -> Self {
        Self {
            current: ArcSwap::from_pointee(index),
            writer,
            rebuild_lock: Mutex::new(()),
        }
    }

    /// The current generation
    pub fn snapshot(&self) -> Arc<Index> {
        self.current.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.current.load().generation()
    }

    /// Build a new generation from `lines` and publish it
    ///
    /// On failure the current generation stays in place.
    pub fn rebuild<I, S>(&self, lines: I) -> Result<Arc<Index>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.rebuild_with(|writer| writer.build(lines))
    }

    /// Like [`IndexHandle::rebuild`] for fallible line sources
    pub fn rebuild_from_lines<I, S, E>(&self, lines: I) -> Result<Arc<Index>>
    where
        I: IntoIterator<Item = std::result::Result<S, E>>,
        S: AsRef<str>,
        E: Display,
    {
        self.rebuild_with(|writer| writer.build_from_lines(lines))
    }

    /// Replace the current generation with a snapshot loaded from disk
    ///
    /// The loaded index keeps its stored generation unless that would move
    /// backwards, in which case it is renumbered past the current one.
    pub fn load_snapshot(&self, path: impl AsRef<Path>) -> Result<Arc<Index>> {
        let _guard = self.rebuild_lock.lock();
        let loaded = match self.writer.tokenizer_config() {
            Some(_) => Index::open(path.as_ref())?,
            None => Index::open_with_analyzer(path.as_ref(), Arc::clone(self.writer.analyzer()))?,
        };
        if loaded.tokenizer_config() != self.writer.tokenizer_config() {
            return Err(LexisError::InvalidRequest(
                "snapshot was built with a different tokenizer configuration".to_string(),
            ));
        }
        let current = self.generation();
        let loaded = if loaded.generation() <= current {
            loaded.with_generation(current + 1)
        } else {
            loaded
        };
        let loaded = Arc::new(loaded);
        self.current.store(Arc::clone(&loaded));
        info!(generation = loaded.generation(), "loaded index snapshot");
        Ok(loaded)
    }

    fn rebuild_with<F>(&self, build: F) -> Result<Arc<Index>>
    where
        F: FnOnce(&IndexWriter) -> Result<Index>,
    {
        let _guard = self.rebuild_lock.lock();
        let next_generation = self.generation() + 1;
        let writer = self.writer.clone().with_generation(next_generation);

        match build(&writer) {
            Ok(index) => {
                let index = Arc::new(index);
                self.current.store(Arc::clone(&index));
                info!(generation = next_generation, "published index generation");
                Ok(index)
            }
            Err(e) => {
                warn!(
                    generation = next_generation - 1,
                    "rebuild failed, keeping current index: {}", e
                );
                Err(e)
            }
        }
    }
}
