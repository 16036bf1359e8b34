//! Lucene-style query string parser
//!
//! Supports syntax like:
//! - `muscle AND pain`, `muscle && pain`
//! - `muscle OR ache`, `+muscle -cell`, `muscle NOT cell`
//! - `"muscle pain"~2`
//! - `mus*`, `m?scle`
//! - `miscle~`, `miscle~0.2`, `miscle~1`
//! - `(pain OR ache)^2`
//!
//! Operator keywords are uppercase only; `and` is an ordinary word.
//! Field-qualified clauses and ranges are rejected.
//!
//! # Example
//!
//! ```rust
//! use lexis::query::query_string::QueryStringParser;
//!
//! let mut parser = QueryStringParser::new("muscle AND (pain OR ache)").unwrap();
//! let query = parser.parse().unwrap();
//! assert!(query.is_some());
//! ```

pub mod lexer;
pub mod parser;

pub use lexer::{Lexer, Token};
pub use parser::QueryStringParser;
