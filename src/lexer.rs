//! A module implementing lexical analysis (tokenization) for the shell's command language.
//!
//! The grammar knows four kinds of tokens: bare words, signed numbers, quoted strings and
//! the `;` separator. Whitespace only delimits tokens and never becomes part of one.

use crate::error::SyntaxError;
use regex::Regex;
use std::sync::LazyLock;

/// `"..."` with backslash escapes. An escaped quote does not close the string.
static DOUBLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(?s:[^"\\]|\\.)*""#).expect("valid regex"));

/// `'...'` where `\'` and `\\` may appear inside.
static SINGLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^'(?s:[^'\\]|\\.)*'").expect("valid regex"));

/// Optionally signed integer or decimal with an optional exponent.
static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").expect("valid regex")
});

/// Word characters, dots and hyphens, not starting with a digit.
static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[.\-]|[\w--\d])[\w.\-]*").expect("valid regex"));

/// Kind of a lexical unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unquoted run of word characters, dots and hyphens.
    Word,
    /// Signed integer or decimal literal.
    Number,
    /// Single- or double-quoted string, quotes included in the raw text.
    Str,
    /// The `;` command separator.
    Separator,
}

/// A token resulting from lexical analysis.
///
/// `text` is the raw span of the input (quotes and escapes untouched), `pos` its byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub pos: usize,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    fn make_tokens(&mut self) -> Result<Vec<Token<'a>>, SyntaxError> {
        let mut out = Vec::new();

        loop {
            self.skip_whitespace();
            let Some(ch) = self.peek_char() else {
                break;
            };

            let token = match ch {
                ';' => self.take(TokenKind::Separator, 1),
                '"' | '\'' => self.read_string(ch)?,
                _ => self.read_number_or_word(ch)?,
            };
            out.push(token);
        }

        Ok(out)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    fn take(&mut self, kind: TokenKind, len: usize) -> Token<'a> {
        let token = Token {
            kind,
            text: &self.input[self.pos..self.pos + len],
            pos: self.pos,
        };
        self.pos += len;
        token
    }

    fn read_string(&mut self, quote: char) -> Result<Token<'a>, SyntaxError> {
        let re = if quote == '"' {
            &DOUBLE_QUOTED
        } else {
            &SINGLE_QUOTED
        };
        let len = match re.find(self.rest()) {
            Some(m) => m.end(),
            None => return Err(SyntaxError::UnterminatedQuote { pos: self.pos }),
        };
        let token = self.take(TokenKind::Str, len);
        self.expect_delimiter()?;
        Ok(token)
    }

    /// Numbers are tried before words; whichever matches first is kept.
    fn read_number_or_word(&mut self, ch: char) -> Result<Token<'a>, SyntaxError> {
        if let Some(m) = NUMBER.find(self.rest()) {
            let start = self.pos;
            let token = self.take(TokenKind::Number, m.end());
            if !self.at_delimiter() {
                let run = self.rest().find(is_delimiter).unwrap_or(self.rest().len());
                return Err(SyntaxError::MalformedNumber {
                    text: self.input[start..self.pos + run].to_string(),
                    pos: start,
                });
            }
            return Ok(token);
        }

        if let Some(m) = WORD.find(self.rest()) {
            let token = self.take(TokenKind::Word, m.end());
            self.expect_delimiter()?;
            return Ok(token);
        }

        Err(SyntaxError::IllegalCharacter { ch, pos: self.pos })
    }

    fn at_delimiter(&self) -> bool {
        self.peek_char().is_none_or(is_delimiter)
    }

    fn expect_delimiter(&self) -> Result<(), SyntaxError> {
        match self.peek_char() {
            Some(ch) if !is_delimiter(ch) => Err(SyntaxError::IllegalCharacter { ch, pos: self.pos }),
            _ => Ok(()),
        }
    }
}

fn is_delimiter(ch: char) -> bool {
    ch == ';' || ch.is_whitespace()
}

/// Returns true when `text` would be read back as exactly one bare word.
///
/// Used when rendering string values back to source text: anything else has to be quoted.
pub fn is_bare_word(text: &str) -> bool {
    if NUMBER.is_match(text) {
        return false;
    }
    WORD.find(text).is_some_and(|m| m.end() == text.len())
}

/// The main entry point function to perform lexical analysis.
///
/// # Returns
/// A vector of tokens on success, or a [`SyntaxError`] describing the first offending
/// position (unterminated quote, illegal character, malformed number).
pub fn split_into_tokens(line: &str) -> Result<Vec<Token<'_>>, SyntaxError> {
    Lexer::new(line).make_tokens()
}
