use crate::error::SyntaxError;
use crate::lexer::{self, Token, TokenKind};
use crate::value::{self, Value};
use log::trace;

/// One command of an input line: the command name and its typed arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    /// The leading bare word. Never empty.
    pub name: String,
    /// Arguments in order of appearance.
    pub args: Vec<Value>,
    /// Parallel to `args`: whether the argument was written as a quoted string.
    pub quoted: Vec<bool>,
}

impl ParsedCommand {
    /// A command whose arguments were all written bare.
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        let quoted = vec![false; args.len()];
        Self {
            name: name.into(),
            args,
            quoted,
        }
    }

    pub fn is_quoted(&self, index: usize) -> bool {
        self.quoted.get(index).copied().unwrap_or(false)
    }
}

/// The commands of one input line, in the order they have to run.
///
/// Empty segments (`;;`, blank input) do not produce commands, so a blank line parses to an
/// empty `ParsedLine` rather than an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLine {
    pub commands: Vec<ParsedCommand>,
}

impl ParsedLine {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParsedCommand> {
        self.commands.iter()
    }
}

impl IntoIterator for ParsedLine {
    type Item = ParsedCommand;
    type IntoIter = std::vec::IntoIter<ParsedCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParsedLine {
    type Item = &'a ParsedCommand;
    type IntoIter = std::slice::Iter<'a, ParsedCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

struct LineBuilder<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> LineBuilder<'a> {
    fn from(tokens: Vec<Token<'a>>) -> Self {
        LineBuilder { tokens, pos: 0 }
    }

    /// line: command? (';' command?)*
    fn build_line(mut self) -> Result<ParsedLine, SyntaxError> {
        let mut commands = Vec::new();

        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Separator => {
                    self.consume();
                }
                TokenKind::Word => {
                    self.consume();
                    commands.push(self.parse_command(token)?);
                }
                TokenKind::Number | TokenKind::Str => {
                    return Err(SyntaxError::ExpectedCommandName {
                        found: token.text.to_string(),
                        pos: token.pos,
                    });
                }
            }
        }

        Ok(ParsedLine { commands })
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn consume(&mut self) -> Option<Token<'a>> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// command: WORD argument*
    fn parse_command(&mut self, name: Token<'a>) -> Result<ParsedCommand, SyntaxError> {
        let mut args = Vec::new();
        let mut quoted = Vec::new();
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::Separator {
                break;
            }
            args.push(value::coerce(&token)?);
            quoted.push(token.kind == TokenKind::Str);
            self.consume();
        }

        Ok(ParsedCommand {
            name: name.text.to_string(),
            args,
            quoted,
        })
    }
}

/// Parse one raw input line into the commands it contains.
///
/// Parsing is pure: the same line always yields the same [`ParsedLine`].
///
/// # Errors
///
/// Returns a [`SyntaxError`] for an unterminated quote, an illegal character, a malformed
/// number, an undecodable escape sequence, or a segment that does not start with a bare word.
pub fn parse(line: &str) -> Result<ParsedLine, SyntaxError> {
    let tokens = lexer::split_into_tokens(line)?;
    trace!("tokens = {:?}", tokens);
    LineBuilder::from(tokens).build_line()
}
