//! On-disk snapshots of a built index
//!
//! File layout: `LXIS` magic, little-endian CRC32 of the payload, then the
//! bincode-encoded [`IndexSnapshot`]. Writes go to a temporary sibling file
//! which is fsynced and renamed over the target, so a crash leaves either
//! the old snapshot or the new one.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::index::Index;
use super::postings::PostingList;
use super::statistics::IndexStatistics;
use super::store::DocumentStore;
use super::term_dict::TermDictionary;
use crate::config::TokenizerConfig;
use crate::error::LexisError;
use crate::tokenizer::{Analyzer, Tokenizer};
use crate::Result;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

const MAGIC: &[u8; 4] = b"LXIS";
const HEADER_LEN: usize = 8;

/// Serialized form of an [`Index`]
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub version: u32,
    pub generation: u64,
    pub tokenizer_config: Option<TokenizerConfig>,
    /// Raw FST bytes of the term dictionary
    pub fst: Vec<u8>,
    /// vbyte-encoded posting lists, concatenated in ordinal order
    pub postings: Vec<u8>,
    pub documents: Vec<String>,
    pub doc_count: u32,
}

impl IndexSnapshot {
    pub fn from_index(index: &Index) -> Self {
        let mut postings = Vec::new();
        for list in index.posting_lists() {
            list.encode(&mut postings);
        }
        Self {
            version: SNAPSHOT_VERSION,
            generation: index.generation(),
            tokenizer_config: index.tokenizer_config().cloned(),
            fst: index.terms().fst_bytes().to_vec(),
            postings,
            documents: index.documents().as_slice().to_vec(),
            doc_count: index.statistics().doc_count,
        }
    }

    /// Check if this snapshot version can be read
    pub fn is_compatible(&self) -> bool {
        self.version <= SNAPSHOT_VERSION
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(self)?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
            return Err(LexisError::CorruptSnapshot(
                "missing snapshot header".to_string(),
            ));
        }
        let mut crc = [0u8; 4];
        crc.copy_from_slice(&bytes[4..HEADER_LEN]);
        let expected = u32::from_le_bytes(crc);

        let payload = &bytes[HEADER_LEN..];
        let actual = crc32fast::hash(payload);
        if actual != expected {
            return Err(LexisError::CorruptSnapshot(format!(
                "checksum mismatch: expected {:08x}, got {:08x}",
                expected, actual
            )));
        }

        let snapshot: IndexSnapshot = bincode::deserialize(payload)
            .map_err(|e| LexisError::CorruptSnapshot(format!("undecodable payload: {}", e)))?;
        if !snapshot.is_compatible() {
            return Err(LexisError::IncompatibleSnapshot {
                expected: SNAPSHOT_VERSION,
                actual: snapshot.version,
            });
        }
        Ok(snapshot)
    }

    /// Rebuild the index, analyzing queries with `analyzer`
    pub fn into_index(self, analyzer: Arc<dyn Analyzer>) -> Result<Index> {
        let terms = TermDictionary::new(self.fst)
            .map_err(|e| LexisError::CorruptSnapshot(format!("bad term dictionary: {}", e)))?;

        let mut postings = Vec::with_capacity(terms.len());
        let mut pos = 0;
        while pos < self.postings.len() {
            let list = PostingList::decode(&self.postings, &mut pos)
                .map_err(|e| LexisError::CorruptSnapshot(format!("bad posting list: {}", e)))?;
            postings.push(list);
        }

        Index::from_parts(
            self.generation,
            analyzer,
            self.tokenizer_config,
            terms,
            postings,
            DocumentStore::from_documents(self.documents),
            IndexStatistics::with_doc_count(self.doc_count),
        )
        .map_err(|e| match e {
            LexisError::Internal(msg) => LexisError::CorruptSnapshot(msg),
            other => other,
        })
    }
}

impl Index {
    /// Persist this index atomically to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = IndexSnapshot::from_index(self).to_bytes()?;

        let tmp = tmp_path(path);
        if let Err(e) = write_and_rename(&tmp, path, &bytes) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!("failed to remove {}: {}", tmp.display(), cleanup);
                }
            }
            return Err(e.into());
        }
        sync_parent_dir(path)?;

        info!(
            generation = self.generation(),
            bytes = bytes.len(),
            "saved index snapshot to {}",
            path.display()
        );
        Ok(())
    }

    /// Load a snapshot written by [`Index::save`]
    ///
    /// The analyzer is rebuilt from the stored tokenizer configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<Index> {
        let snapshot = read_snapshot(path.as_ref())?;
        let config = snapshot.tokenizer_config.clone().ok_or_else(|| {
            LexisError::InvalidRequest(
                "snapshot was built with a custom analyzer; use open_with_analyzer".to_string(),
            )
        })?;
        config
            .validate()
            .map_err(|e| LexisError::CorruptSnapshot(format!("bad tokenizer config: {}", e)))?;
        snapshot.into_index(Arc::new(Tokenizer::new(&config)))
    }

    /// Load a snapshot, analyzing queries with a caller-supplied analyzer
    pub fn open_with_analyzer(path: impl AsRef<Path>, analyzer: Arc<dyn Analyzer>) -> Result<Index> {
        read_snapshot(path.as_ref())?.into_index(analyzer)
    }
}

fn write_and_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp, path)
}

fn read_snapshot(path: &Path) -> Result<IndexSnapshot> {
    let bytes = fs::read(path)?;
    IndexSnapshot::from_bytes(&bytes)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        File::open(parent)?.sync_all()?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<()> {
    Ok(())
}
