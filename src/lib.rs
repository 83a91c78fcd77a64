//! A small interactive command shell.
//!
//! A raw input line goes through three stages:
//!
//! 1. [`parse`] splits it into `;`-separated commands and coerces every argument into a
//!    typed [`Value`] (integer, float or string, with escapes in quoted strings decoded).
//! 2. The [`Registry`](registry::Registry) resolves each command name or alias to a
//!    handler. It is populated once at startup and only read afterwards.
//! 3. [`dispatch`] invokes the handlers in order against the shared
//!    [`Environment`](env::Environment), reporting unknown commands and handler failures
//!    as `<command>: <message>` lines without stopping the rest of the line.
//!
//! [`Interpreter`] ties the stages together with the built-in commands and a line editor.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
mod interpreter;
pub mod lexer;
mod parser;
pub mod registry;
mod value;

pub use error::{ShellError, SyntaxError};
/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Interpreter, dispatch, is_exit_word};
pub use parser::{ParsedCommand, ParsedLine, parse};
pub use value::Value;
