//! Recursive descent parser for query strings
//!
//! # Grammar
//!
//! ```text
//! query     := or_expr? EOF
//! or_expr   := and_expr (OR and_expr)*
//! and_expr  := clause ((AND)? clause)*
//! clause    := ('+' | '-' | NOT)? primary
//! primary   := grouped | phrase | term
//! grouped   := '(' or_expr ')' boost?
//! phrase    := QUOTED ('~' slop)? boost?
//! term      := TERM ('~' fuzziness?)? boost?
//! boost     := '^' number
//! ```
//!
//! Clauses inside an `and_expr` carry an occurrence: `+` makes a clause
//! required, `-`/`NOT` prohibits it, and a bare clause takes the default
//! operator. An explicit `AND` makes both neighbours required.

use super::lexer::{Lexer, Token};
use crate::error::LexisError;
use crate::query::ast::QueryNode;
use crate::query::nodes::{BoolQuery, FuzzyQuery, PhraseQuery, PrefixQuery, TermQuery, WildcardQuery};
use crate::query::types::{Fuzziness, MatchOperator};
use crate::Result;

/// Groups nested deeper than this are rejected
const MAX_DEPTH: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Occur {
    Must,
    Should,
    MustNot,
}

struct Clause {
    occur: Occur,
    node: Box<dyn QueryNode>,
}

/// Parser for Lucene-style query strings
pub struct QueryStringParser {
    lexer: Lexer,
    current_token: Token,
    /// Operator between adjacent clauses with no explicit operator
    default_operator: MatchOperator,
    /// Similarity used by `term~` with no explicit value
    fuzzy_similarity: f32,
    depth: usize,
}

impl QueryStringParser {
    pub fn new(input: &str) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token()?;

        Ok(Self {
            lexer,
            current_token,
            default_operator: MatchOperator::Or,
            fuzzy_similarity: 0.5,
            depth: 0,
        })
    }

    pub fn with_default_operator(mut self, operator: MatchOperator) -> Self {
        self.default_operator = operator;
        self
    }

    pub fn with_fuzzy_similarity(mut self, similarity: f32) -> Self {
        self.fuzzy_similarity = similarity;
        self
    }

    /// Parse the query string into a query AST
    ///
    /// Blank input yields `None`.
    pub fn parse(&mut self) -> Result<Option<Box<dyn QueryNode>>> {
        if self.current_token == Token::Eof {
            return Ok(None);
        }

        let query = self.parse_or_expr()?;

        if self.current_token != Token::Eof {
            return Err(self.error(format!(
                "Unexpected token after query: {:?}",
                self.current_token
            )));
        }

        Ok(Some(query))
    }

    /// Parse: or_expr := and_expr (OR and_expr)*
    fn parse_or_expr(&mut self) -> Result<Box<dyn QueryNode>> {
        let mut alternatives = vec![self.parse_and_expr()?];

        while self.current_token == Token::Or {
            self.advance()?;
            if !self.is_start_of_clause() {
                return Err(self.error("Expected a clause after OR".to_string()));
            }
            alternatives.push(self.parse_and_expr()?);
        }

        if alternatives.len() == 1 {
            return Ok(alternatives.remove(0));
        }

        let query = alternatives
            .into_iter()
            .fold(BoolQuery::new(), |q, node| q.should_boxed(node));
        Ok(Box::new(query))
    }

    /// Parse: and_expr := clause ((AND)? clause)*
    fn parse_and_expr(&mut self) -> Result<Box<dyn QueryNode>> {
        let default_occur = match self.default_operator {
            MatchOperator::And => Occur::Must,
            MatchOperator::Or => Occur::Should,
        };

        let mut clauses = vec![self.parse_clause(default_occur)?];

        loop {
            if self.current_token == Token::And {
                self.advance()?;
                if !self.is_start_of_clause() {
                    return Err(self.error("Expected a clause after AND".to_string()));
                }
                if let Some(last) = clauses.last_mut() {
                    if last.occur == Occur::Should {
                        last.occur = Occur::Must;
                    }
                }
                clauses.push(self.parse_clause(Occur::Must)?);
            } else if self.is_start_of_clause() {
                clauses.push(self.parse_clause(default_occur)?);
            } else {
                break;
            }
        }

        if clauses.len() == 1 && clauses[0].occur != Occur::MustNot {
            return Ok(clauses.remove(0).node);
        }

        let query = clauses
            .into_iter()
            .fold(BoolQuery::new(), |q, clause| match clause.occur {
                Occur::Must => q.must_boxed(clause.node),
                Occur::Should => q.should_boxed(clause.node),
                Occur::MustNot => q.must_not_boxed(clause.node),
            });
        Ok(Box::new(query))
    }

    /// Parse: clause := ('+' | '-' | NOT)? primary
    fn parse_clause(&mut self, default_occur: Occur) -> Result<Clause> {
        let occur = match self.current_token {
            Token::Plus => {
                self.advance()?;
                Occur::Must
            }
            Token::Minus | Token::Not => {
                self.advance()?;
                Occur::MustNot
            }
            _ => default_occur,
        };

        let node = self.parse_primary()?;
        Ok(Clause { occur, node })
    }

    /// Parse: primary := grouped | phrase | term
    fn parse_primary(&mut self) -> Result<Box<dyn QueryNode>> {
        match &self.current_token {
            Token::LeftParen => {
                self.advance()?;
                if self.current_token == Token::RightParen {
                    return Err(self.error("Empty group".to_string()));
                }

                self.depth += 1;
                if self.depth > MAX_DEPTH {
                    return Err(self.error(format!(
                        "Groups nested deeper than {} levels",
                        MAX_DEPTH
                    )));
                }
                let inner = self.parse_or_expr()?;
                self.depth -= 1;

                if self.current_token != Token::RightParen {
                    return Err(self.error(format!(
                        "Expected closing parenthesis, got {:?}",
                        self.current_token
                    )));
                }
                self.advance()?;

                match self.parse_boost()? {
                    Some(boost) => Ok(Box::new(
                        BoolQuery::new().must_boxed(inner).with_boost(boost),
                    )),
                    None => Ok(inner),
                }
            }
            Token::QuotedString(text) => {
                let phrase = text.clone();
                self.advance()?;
                self.parse_phrase_with_modifiers(phrase)
            }
            Token::Term(term) => {
                let term = term.clone();
                self.advance()?;
                self.parse_term_with_modifiers(term)
            }
            Token::Eof => Err(self.error("Unexpected end of query".to_string())),
            token => Err(self.error(format!("Unexpected token: {:?}", token))),
        }
    }

    fn parse_phrase_with_modifiers(&mut self, phrase: String) -> Result<Box<dyn QueryNode>> {
        let mut query = PhraseQuery::new(phrase);

        if let Token::Tilde(slop) = self.current_token {
            query = match slop {
                Some(slop) if slop.fract() == 0.0 => query.with_slop(slop as u32),
                _ => {
                    return Err(self.error(
                        "Phrase slop must be a whole number, e.g. \"a b\"~2".to_string(),
                    ))
                }
            };
            self.advance()?;
        }

        if let Some(boost) = self.parse_boost()? {
            query = query.with_boost(boost);
        }
        Ok(Box::new(query))
    }

    /// Parse a term with optional fuzzy and boost modifiers
    ///
    /// A single trailing `*` makes a prefix query, any other `*`/`?` a
    /// wildcard query.
    fn parse_term_with_modifiers(&mut self, term: String) -> Result<Box<dyn QueryNode>> {
        let has_wildcard = term.contains(['*', '?']);
        let prefix = term
            .strip_suffix('*')
            .filter(|rest| !rest.contains(['*', '?']));

        let fuzziness = match self.current_token {
            Token::Tilde(value) => {
                self.advance()?;
                Some(self.fuzziness_from(value)?)
            }
            _ => None,
        };
        let boost = self.parse_boost()?.unwrap_or(1.0);

        if let Some(fuzziness) = fuzziness {
            if has_wildcard {
                return Err(self.error(format!(
                    "Fuzzy operator cannot follow a wildcard term: {}",
                    term
                )));
            }
            return Ok(Box::new(FuzzyQuery::new(term, fuzziness).with_boost(boost)));
        }

        if let Some(prefix) = prefix {
            Ok(Box::new(PrefixQuery::new(prefix).with_boost(boost)))
        } else if has_wildcard {
            Ok(Box::new(WildcardQuery::new(term).with_boost(boost)))
        } else {
            Ok(Box::new(TermQuery::new(term).with_boost(boost)))
        }
    }

    /// `~` alone uses the configured similarity, a whole `~N` is an edit
    /// distance and a fraction is a similarity
    fn fuzziness_from(&self, value: Option<f32>) -> Result<Fuzziness> {
        match value {
            None => Ok(Fuzziness::Similarity(self.fuzzy_similarity)),
            Some(v) if v.fract() == 0.0 => Ok(Fuzziness::Edits(v as u32)),
            Some(v) if v < 1.0 => Ok(Fuzziness::Similarity(v)),
            Some(v) => Err(self.error(format!(
                "Fuzzy value must be below 1 or a whole edit count, got {}",
                v
            ))),
        }
    }

    fn parse_boost(&mut self) -> Result<Option<f32>> {
        match self.current_token {
            Token::Caret(Some(boost)) => {
                self.advance()?;
                Ok(Some(boost))
            }
            Token::Caret(None) => Err(self.error("Boost operator '^' needs a number".to_string())),
            _ => Ok(None),
        }
    }

    fn is_start_of_clause(&self) -> bool {
        matches!(
            self.current_token,
            Token::Term(_)
                | Token::QuotedString(_)
                | Token::LeftParen
                | Token::Plus
                | Token::Minus
                | Token::Not
        )
    }

    fn advance(&mut self) -> Result<()> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn error(&self, message: String) -> LexisError {
        LexisError::QueryParse(format!("{} (near position {})", message, self.lexer.position()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::context::QueryContext;
    use crate::segment::{Index, IndexWriter};

    fn parse(input: &str) -> Result<Option<Box<dyn QueryNode>>> {
        QueryStringParser::new(input)?.parse()
    }

    fn parse_node(input: &str) -> Box<dyn QueryNode> {
        parse(input).unwrap().unwrap()
    }

    fn index() -> Index {
        IndexWriter::default()
            .build(["Muscle pain", "Miscle ache", "Schwann cell", "Epidemic", "muscle cell"])
            .unwrap()
    }

    fn matches(input: &str, operator: MatchOperator) -> Vec<u32> {
        let index = index();
        let ctx = QueryContext::new(&index);
        let node = QueryStringParser::new(input)
            .unwrap()
            .with_default_operator(operator)
            .parse()
            .unwrap()
            .unwrap();
        node.execute(&ctx).unwrap().iter().collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").unwrap().is_none());
        assert!(parse("  \t").unwrap().is_none());
    }

    #[test]
    fn test_node_kinds() {
        assert_eq!(parse_node("muscle").query_type(), "term");
        assert_eq!(parse_node("mus*").query_type(), "prefix");
        assert_eq!(parse_node("m?scle").query_type(), "wildcard");
        assert_eq!(parse_node("*cle").query_type(), "wildcard");
        assert_eq!(parse_node("miscle~").query_type(), "fuzzy");
        assert_eq!(parse_node("\"muscle pain\"").query_type(), "phrase");
        assert_eq!(parse_node("muscle AND pain").query_type(), "bool");
        assert_eq!(parse_node("(muscle)").query_type(), "term");
        assert_eq!(parse_node("+muscle").query_type(), "term");
        assert_eq!(parse_node("-muscle").query_type(), "bool");
    }

    #[test]
    fn test_boolean_semantics() {
        let or = MatchOperator::Or;
        assert_eq!(matches("muscle AND cell", or), vec![4]);
        assert_eq!(matches("muscle OR epidemic", or), vec![0, 3, 4]);
        assert_eq!(matches("muscle NOT cell", or), vec![0]);
        assert_eq!(matches("muscle -cell", or), vec![0]);
        assert_eq!(matches("muscle && !pain", or), vec![4]);
        assert_eq!(matches("(pain OR ache) AND m*", or), vec![0, 1]);
        assert_eq!(matches("NOT muscle", or), Vec::<u32>::new());
    }

    #[test]
    fn test_default_operator() {
        assert_eq!(matches("muscle cell", MatchOperator::Or), vec![0, 2, 4]);
        assert_eq!(matches("muscle cell", MatchOperator::And), vec![4]);
        assert_eq!(matches("+muscle cell", MatchOperator::Or), vec![0, 4]);
        assert_eq!(matches("muscle OR epidemic", MatchOperator::And), vec![0, 3, 4]);
    }

    #[test]
    fn test_lowercase_operators_are_terms() {
        // "and" is searched as a word, not applied as an operator
        assert_eq!(matches("muscle and cell", MatchOperator::Or), vec![0, 2, 4]);
    }

    #[test]
    fn test_fuzzy_modifiers() {
        let or = MatchOperator::Or;
        assert_eq!(matches("miscle~0.2", or), vec![0, 1, 4]);
        assert_eq!(matches("miscle~0", or), vec![1]);
        assert_eq!(matches("miscle~1", or), vec![0, 1, 4]);
        assert!(parse("miscle~1.5").is_err());
        assert!(parse("mis*~").is_err());
    }

    #[test]
    fn test_phrase_and_boost() {
        let or = MatchOperator::Or;
        assert_eq!(matches("\"muscle pain\"", or), vec![0]);
        assert_eq!(matches("\"pain muscle\"~2", or), vec![0]);
        assert_eq!(matches("pain^2 OR (cell)^0.5", or), vec![0, 2, 4]);
        assert!(parse("\"muscle pain\"~0.5").is_err());
        assert!(parse("pain^").is_err());
    }

    #[test]
    fn test_malformed_queries() {
        for input in [
            "muscle AND",
            "AND muscle",
            "muscle OR",
            "OR",
            "NOT",
            "(muscle",
            "muscle)",
            "()",
            "muscle AND (pain OR",
            "\"open phrase",
            "title:muscle",
            "[a TO b]",
            "a || || b",
        ] {
            let err = match parse(input) {
                Err(e) => e,
                Ok(_) => panic!("expected parse error for {:?}", input),
            };
            assert!(matches!(err, LexisError::QueryParse(_)), "{:?}", input);
        }
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}muscle{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert!(parse(&deep).is_err());

        let ok = format!("{}muscle{}", "(".repeat(8), ")".repeat(8));
        assert_eq!(parse_node(&ok).query_type(), "term");
    }
}
