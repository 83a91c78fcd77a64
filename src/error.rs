//! Error kinds surfaced by the parser and the dispatcher.
//!
//! Every variant of [`ShellError`] renders as a single user-facing line in the
//! `<tag>: <message>` convention, so the read loop can print it verbatim.

use thiserror::Error;

/// Errors that can occur while turning a raw input line into a
/// [`ParsedLine`](crate::ParsedLine).
///
/// Positions are byte offsets into the input line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// A single or double quote was opened but never closed.
    #[error("unterminated quote at position {pos}")]
    UnterminatedQuote { pos: usize },

    /// A character that cannot start or continue any token.
    #[error("illegal character '{ch}' at position {pos}")]
    IllegalCharacter { ch: char, pos: usize },

    /// A numeric literal running straight into other characters, e.g. `5x`.
    #[error("malformed number '{text}' at position {pos}")]
    MalformedNumber { text: String, pos: usize },

    /// A command segment that does not begin with a bare word.
    #[error("expected a command name at position {pos}, found '{found}'")]
    ExpectedCommandName { found: String, pos: usize },

    /// An escape sequence inside a quoted string that cannot be decoded.
    #[error("invalid escape sequence '{text}' at position {pos}")]
    InvalidEscape { text: String, pos: usize },
}

/// A failure reported while handling one input line.
///
/// None of these stop the read loop; they are printed and the shell moves on.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The line could not be tokenized or parsed.
    #[error("error: {0}")]
    Syntax(#[from] SyntaxError),

    /// No handler is registered under the attempted name.
    #[error("{name}: not a command")]
    UnknownCommand { name: String },

    /// A handler returned an error.
    #[error("{name}: {error:#}")]
    Handler { name: String, error: anyhow::Error },
}

impl ShellError {
    /// Name of the command this error is tagged with, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            ShellError::Syntax(_) => None,
            ShellError::UnknownCommand { name } | ShellError::Handler { name, .. } => Some(name),
        }
    }

    /// Whether the handler already wrote its own error lines.
    pub(crate) fn is_reported(&self) -> bool {
        matches!(self, ShellError::Handler { error, .. } if error.is::<Reported>())
    }
}

/// Returned by handlers that have already written per-operand error lines
/// (e.g. `rm a b c` where only `b` failed).
///
/// The dispatcher still records the failure but does not print it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{failed} operand(s) failed")]
pub struct Reported {
    pub failed: usize,
}
