//! Tokenizer for query strings

use crate::error::LexisError;
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare word, possibly containing `*` or `?`
    Term(String),
    /// Text between double quotes
    QuotedString(String),

    /// `AND` or `&&`
    And,
    /// `OR` or `||`
    Or,
    /// `NOT` or `!`
    Not,

    /// `~` with an optional number
    Tilde(Option<f32>),
    /// `^` with an optional number
    Caret(Option<f32>),

    LeftParen,
    RightParen,

    Plus,
    Minus,

    Eof,
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let Some(ch) = self.current_char() else {
            return Ok(Token::Eof);
        };

        match ch {
            '(' => {
                self.advance();
                Ok(Token::LeftParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RightParen)
            }
            '+' => {
                self.advance();
                Ok(Token::Plus)
            }
            '-' => {
                self.advance();
                Ok(Token::Minus)
            }
            '!' => {
                self.advance();
                Ok(Token::Not)
            }
            '~' => {
                self.advance();
                Ok(Token::Tilde(self.read_number()?))
            }
            '^' => {
                self.advance();
                Ok(Token::Caret(self.read_number()?))
            }
            '"' => {
                self.advance();
                self.read_quoted_string()
            }
            '&' | '|' => {
                if self.peek() == Some(ch) {
                    self.advance();
                    self.advance();
                    Ok(if ch == '&' { Token::And } else { Token::Or })
                } else {
                    Err(self.unexpected(ch))
                }
            }
            ':' => Err(LexisError::QueryParse(format!(
                "Field-qualified clauses are not supported (position {})",
                self.position
            ))),
            '[' | ']' | '{' | '}' => Err(LexisError::QueryParse(format!(
                "Range queries are not supported (position {})",
                self.position
            ))),
            _ if Self::is_term_start(ch) => self.read_term(),
            _ => Err(self.unexpected(ch)),
        }
    }

    /// Position of the next unread character
    pub fn position(&self) -> usize {
        self.position
    }

    fn read_term(&mut self) -> Result<Token> {
        let mut term = String::new();

        while let Some(ch) = self.current_char() {
            if ch == '\\' {
                self.advance();
                match self.current_char() {
                    Some(escaped) => {
                        term.push(escaped);
                        self.advance();
                    }
                    None => {
                        return Err(LexisError::QueryParse(
                            "Dangling escape at end of query".to_string(),
                        ))
                    }
                }
            } else if Self::is_term_char(ch) {
                term.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Operators are case-sensitive: "and" is an ordinary word
        match term.as_str() {
            "AND" => Ok(Token::And),
            "OR" => Ok(Token::Or),
            "NOT" => Ok(Token::Not),
            _ => Ok(Token::Term(term)),
        }
    }

    fn read_quoted_string(&mut self) -> Result<Token> {
        let mut s = String::new();

        while let Some(ch) = self.current_char() {
            self.advance();
            match ch {
                '"' => return Ok(Token::QuotedString(s)),
                '\\' => {
                    if let Some(escaped) = self.current_char() {
                        s.push(escaped);
                        self.advance();
                    }
                }
                _ => s.push(ch),
            }
        }

        Err(LexisError::QueryParse(
            "Unterminated quoted string".to_string(),
        ))
    }

    /// Read an optional unsigned decimal right after `~` or `^`
    fn read_number(&mut self) -> Result<Option<f32>> {
        let start = self.position;
        let mut text = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() || ch == '.' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if text.is_empty() {
            return Ok(None);
        }
        text.parse::<f32>().map(Some).map_err(|_| {
            LexisError::QueryParse(format!("Invalid number '{}' at position {}", text, start))
        })
    }

    fn unexpected(&self, ch: char) -> LexisError {
        LexisError::QueryParse(format!(
            "Unexpected character at position {}: '{}'",
            self.position, ch
        ))
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn is_term_start(ch: char) -> bool {
        ch == '\\' || Self::is_term_char(ch) && ch != '-' && ch != '+'
    }

    fn is_term_char(ch: char) -> bool {
        !ch.is_whitespace()
            && !matches!(
                ch,
                '(' | ')' | '"' | '^' | '~' | ':' | '[' | ']' | '{' | '}' | '!' | '\\'
            )
    }
}
