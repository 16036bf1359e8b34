use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::fmt;
use stop_words::{get, LANGUAGE};

use super::Analyzer;
use crate::config::TokenizerConfig;

/// Standard analyzer: lowercase, split on non-alphanumeric boundaries
///
/// Optional stages (all driven by [`TokenizerConfig`]):
/// - token length bounds, counted in characters
/// - English stopword removal
/// - English stemming
pub struct Tokenizer {
    config: TokenizerConfig,
    stemmer: Option<Stemmer>,
    stopwords: HashSet<String>,
}

impl Tokenizer {
    /// Create a new tokenizer from configuration
    pub fn new(config: &TokenizerConfig) -> Self {
        let stemmer = if config.stem {
            Some(Stemmer::create(Algorithm::English))
        } else {
            None
        };

        let stopwords = if config.remove_stopwords {
            get(LANGUAGE::English)
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect()
        } else {
            HashSet::new()
        };

        Self {
            config: config.clone(),
            stemmer,
            stopwords,
        }
    }

    /// The configuration this tokenizer was built from
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Tokenize text into a vector of terms
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.tokenize_with_positions(text)
            .into_iter()
            .map(|(term, _)| term)
            .collect()
    }

    /// Tokenize and return (term, position) pairs in order
    ///
    /// Positions are 0-indexed and count all raw tokens, so a dropped
    /// stopword still increments the position.
    pub fn tokenize_with_positions(&self, text: &str) -> Vec<(String, u32)> {
        let mut results = Vec::new();
        let mut pos = 0u32;

        for word in split_words(text) {
            let token = if self.config.lowercase {
                word.to_lowercase()
            } else {
                word.to_string()
            };

            if let Some(token) = self.filter_token(token) {
                results.push((token, pos));
            }
            pos += 1;
        }

        results
    }

    fn filter_token(&self, token: String) -> Option<String> {
        let len = token.chars().count();
        if len < self.config.min_token_length || len > self.config.max_token_length {
            return None;
        }

        // Stopwords are matched before stemming
        if self.stopwords.contains(&token) {
            return None;
        }

        match &self.stemmer {
            Some(stemmer) => Some(stemmer.stem(&token).to_string()),
            None => Some(token),
        }
    }
}

/// Split on every non-alphanumeric character, dropping empty pieces
fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
}

impl Analyzer for Tokenizer {
    fn analyze(&self, text: &str) -> Vec<String> {
        self.tokenize(text)
    }

    fn analyze_with_positions(&self, text: &str) -> Vec<(String, u32)> {
        self.tokenize_with_positions(text)
    }

    fn normalize_term(&self, term: &str) -> String {
        if self.config.lowercase {
            term.to_lowercase()
        } else {
            term.to_string()
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(&TokenizerConfig::default())
    }
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("config", &self.config)
            .field("stopwords", &self.stopwords.len())
            .finish()
    }
}
