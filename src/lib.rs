pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod scoring;
pub mod search;
pub mod segment;
pub mod tokenizer;

pub use config::{IndexSettings, TokenizerConfig};
pub use error::{LexisError, Result};
pub use models::{Explanation, ScoredResult, SearchResponse};
pub use query::{Fuzziness, MatchOperator, Query};
pub use search::IndexSearcher;
pub use segment::{DocId, Index, IndexHandle, IndexWriter};
pub use tokenizer::{Analyzer, Tokenizer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
