use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::LexisError;
use crate::query::MatchOperator;
use crate::Result;

/// Default number of hits returned by the searcher entry points
pub const DEFAULT_SEARCH_LIMIT: usize = 100;

/// Default minimum similarity for `fuzzy_search`
pub const DEFAULT_FUZZY_SIMILARITY: f32 = 0.2;

/// Default minimum similarity for `term~` in query strings
pub const DEFAULT_QUERY_FUZZY_SIMILARITY: f32 = 0.5;

/// Index settings configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Analysis applied by writers created with `IndexWriter::from_settings`
    pub tokenizer_config: TokenizerConfig,
    /// Result cap for the searcher entry points
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    /// Similarity ratio used by `fuzzy_search`
    #[serde(default = "default_fuzzy_similarity")]
    pub fuzzy_similarity: f32,
    /// Similarity ratio used for `term~` without an explicit value
    #[serde(default = "default_query_fuzzy_similarity")]
    pub query_fuzzy_similarity: f32,
    /// Operator between adjacent clauses in query strings
    #[serde(default)]
    pub default_operator: MatchOperator,
    /// Upper bound on terms a single multi-term query may expand to
    #[serde(default)]
    pub max_expansions: Option<usize>,
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

fn default_fuzzy_similarity() -> f32 {
    DEFAULT_FUZZY_SIMILARITY
}

fn default_query_fuzzy_similarity() -> f32 {
    DEFAULT_QUERY_FUZZY_SIMILARITY
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            tokenizer_config: TokenizerConfig::default(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            fuzzy_similarity: DEFAULT_FUZZY_SIMILARITY,
            query_fuzzy_similarity: DEFAULT_QUERY_FUZZY_SIMILARITY,
            default_operator: MatchOperator::Or,
            max_expansions: None,
        }
    }
}

impl IndexSettings {
    /// Set the tokenizer configuration
    pub fn with_tokenizer_config(mut self, config: TokenizerConfig) -> Self {
        self.tokenizer_config = config;
        self
    }

    /// Set the result cap for searcher entry points
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Set the similarity ratio used by `fuzzy_search`
    pub fn with_fuzzy_similarity(mut self, similarity: f32) -> Self {
        self.fuzzy_similarity = similarity;
        self
    }

    /// Set the default operator for query strings
    pub fn with_default_operator(mut self, operator: MatchOperator) -> Self {
        self.default_operator = operator;
        self
    }

    /// Cap the number of terms a multi-term query may expand to
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.search_limit == 0 {
            return Err(LexisError::InvalidRequest(
                "search_limit must be greater than zero".to_string(),
            ));
        }
        for (name, value) in [
            ("fuzzy_similarity", self.fuzzy_similarity),
            ("query_fuzzy_similarity", self.query_fuzzy_similarity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(LexisError::InvalidRequest(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        self.tokenizer_config.validate()
    }

    /// Load settings from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        let settings: IndexSettings = serde_json::from_slice(&data)
            .map_err(|e| LexisError::InvalidRequest(format!("invalid settings file: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Write settings as pretty-printed JSON
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_vec_pretty(self)
            .map_err(|e| LexisError::Internal(format!("failed to encode settings: {}", e)))?;
        std::fs::write(path.as_ref(), data)?;
        Ok(())
    }
}

/// Tokenizer configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    pub lowercase: bool,
    pub remove_stopwords: bool,
    pub stem: bool,
    pub min_token_length: usize,
    pub max_token_length: usize,
    pub language: String,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: false,
            stem: false,
            min_token_length: 1,
            max_token_length: 255,
            language: "english".to_string(),
        }
    }
}

impl TokenizerConfig {
    /// Enable English stopword removal
    pub fn with_stopwords(mut self) -> Self {
        self.remove_stopwords = true;
        self
    }

    /// Enable English stemming
    pub fn with_stemming(mut self) -> Self {
        self.stem = true;
        self
    }

    /// Set token length bounds (in characters)
    pub fn with_token_length(mut self, min: usize, max: usize) -> Self {
        self.min_token_length = min;
        self.max_token_length = max;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_token_length == 0 {
            return Err(LexisError::InvalidRequest(
                "min_token_length must be at least 1".to_string(),
            ));
        }
        if self.min_token_length > self.max_token_length {
            return Err(LexisError::InvalidRequest(format!(
                "min_token_length {} exceeds max_token_length {}",
                self.min_token_length, self.max_token_length
            )));
        }
        if (self.stem || self.remove_stopwords) && !self.language.eq_ignore_ascii_case("english")
        {
            return Err(LexisError::InvalidRequest(format!(
                "unsupported analysis language: {}",
                self.language
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_configs() {
        let settings = IndexSettings::default();
        assert_eq!(settings.search_limit, 100);
        assert_eq!(settings.fuzzy_similarity, 0.2);
        assert_eq!(settings.default_operator, MatchOperator::Or);
        assert!(settings.max_expansions.is_none());

        let tokenizer_config = TokenizerConfig::default();
        assert!(tokenizer_config.lowercase);
        assert!(!tokenizer_config.remove_stopwords);
        assert!(!tokenizer_config.stem);
        assert_eq!(tokenizer_config.min_token_length, 1);
    }

    #[test]
    fn test_settings_builder() {
        let settings = IndexSettings::default()
            .with_search_limit(10)
            .with_fuzzy_similarity(0.5)
            .with_default_operator(MatchOperator::And)
            .with_max_expansions(64)
            .with_tokenizer_config(TokenizerConfig::default().with_stemming());

        assert_eq!(settings.search_limit, 10);
        assert_eq!(settings.fuzzy_similarity, 0.5);
        assert_eq!(settings.default_operator, MatchOperator::And);
        assert_eq!(settings.max_expansions, Some(64));
        assert!(settings.tokenizer_config.stem);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(IndexSettings::default().with_search_limit(0).validate().is_err());
        assert!(IndexSettings::default()
            .with_fuzzy_similarity(1.5)
            .validate()
            .is_err());

        let bad_lengths = TokenizerConfig::default().with_token_length(5, 2);
        assert!(bad_lengths.validate().is_err());

        let mut german = TokenizerConfig::default().with_stemming();
        german.language = "german".to_string();
        assert!(german.validate().is_err());
    }

    #[test]
    fn test_json_file_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");

        let settings = IndexSettings::default()
            .with_search_limit(25)
            .with_tokenizer_config(TokenizerConfig::default().with_stopwords());
        settings.to_json_file(&path).unwrap();

        let loaded = IndexSettings::from_json_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_json_missing_fields_use_defaults() {
        let json = r#"{
            "tokenizer_config": {
                "lowercase": true,
                "remove_stopwords": false,
                "stem": false,
                "min_token_length": 1,
                "max_token_length": 255,
                "language": "english"
            }
        }"#;
        let settings: IndexSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.search_limit, DEFAULT_SEARCH_LIMIT);
        assert_eq!(settings.query_fuzzy_similarity, DEFAULT_QUERY_FUZZY_SIMILARITY);
    }
}
