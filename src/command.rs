use crate::env::Environment;
use crate::parser::ParsedCommand;
use crate::value::Value;
use anyhow::Result;
use std::fmt::Display;
use std::io::{self, Write};

/// Output streams lent to a command for the duration of one call.
///
/// `out` receives regular output, `err` receives error lines. The read loop binds them to
/// stdout and stderr; tests bind them to in-memory buffers.
pub struct Io<'a> {
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
}

impl<'a> Io<'a> {
    pub fn new(out: &'a mut dyn Write, err: &'a mut dyn Write) -> Self {
        Self { out, err }
    }

    /// Write one error line in the `<tag>: <message>` convention.
    pub fn error(&mut self, tag: &str, message: impl Display) -> io::Result<()> {
        writeln!(self.err, "{tag}: {message}")
    }
}

/// Object-safe trait for anything that can be registered as a command handler.
///
/// A handler gets the typed arguments, the output streams and the shell state. It may
/// mutate the state in place (e.g. `cd` changes the working directory) but must not keep
/// references to it past the call.
pub trait Command {
    /// Executes the command.
    ///
    /// An `Err` is reported by the dispatcher as `<command-name>: <message>`.
    fn execute(&self, args: &[Value], io: &mut Io<'_>, env: &mut Environment) -> Result<()>;

    /// Executes the command as it was written on the input line.
    ///
    /// This is what the dispatcher calls. Handlers that treat quoted arguments
    /// differently from bare ones override it; the rest get the typed arguments only.
    fn execute_parsed(
        &self,
        command: &ParsedCommand,
        io: &mut Io<'_>,
        env: &mut Environment,
    ) -> Result<()> {
        self.execute(&command.args, io, env)
    }
}

/// Handler backed by a closure, see [`from_fn`].
pub struct FnCommand<F>(F);

impl<F> Command for FnCommand<F>
where
    F: Fn(&[Value], &mut Io<'_>, &mut Environment) -> Result<()>,
{
    fn execute(&self, args: &[Value], io: &mut Io<'_>, env: &mut Environment) -> Result<()> {
        (self.0)(args, io, env)
    }
}

/// Wrap a closure into a [`Command`].
///
/// ```
/// use sigyx::command::{from_fn, Command, Io};
/// use sigyx::env::Environment;
///
/// let greet = from_fn(|_args, io, _env| {
///     writeln!(io.out, "hello")?;
///     Ok(())
/// });
///
/// let (mut out, mut err) = (Vec::new(), Vec::new());
/// let mut env = Environment::new();
/// greet.execute(&[], &mut Io::new(&mut out, &mut err), &mut env).unwrap();
/// assert_eq!(out, b"hello\n");
/// ```
pub fn from_fn<F>(f: F) -> FnCommand<F>
where
    F: Fn(&[Value], &mut Io<'_>, &mut Environment) -> Result<()>,
{
    FnCommand(f)
}
