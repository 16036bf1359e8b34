//! Inverted index for full-text search
//!
//! # Architecture
//!
//! - `IndexWriter`: analyzes lines and builds one immutable generation
//! - `Index`: FST term dictionary, posting lists and stored documents
//! - `IndexHandle`: publishes generations to concurrent readers atomically
//! - `IndexSnapshot`: checksummed on-disk form of an `Index`

mod types;
mod statistics;
mod postings;
mod term_dict;
mod store;
mod index;
mod writer;
mod handle;
mod snapshot;

pub use types::*;
pub use statistics::*;
pub use postings::*;
pub use term_dict::*;
pub use store::*;
pub use index::*;
pub use writer::*;
pub use handle::*;
pub use snapshot::*;
