use crate::command::Io;
use crate::config::Config;
use crate::env::Environment;
use crate::error::ShellError;
use crate::parser::{self, ParsedLine};
use crate::registry::Registry;
use log::{debug, error, info};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;

/// Run every command of a parsed line, left to right.
///
/// Each command is dispatched independently: an unknown name or a failing handler is
/// reported on `io.err` and the remaining commands still run. Dispatch only stops early
/// when a command asks the shell to exit.
///
/// Returns the errors that were reported, in order.
pub fn dispatch(
    registry: &Registry,
    line: &ParsedLine,
    env: &mut Environment,
    io: &mut Io<'_>,
) -> Vec<ShellError> {
    let mut errors = Vec::new();

    for command in line {
        let outcome = match registry.lookup(&command.name) {
            Some(entry) => {
                debug!("dispatching {} {:?}", command.name, command.args);
                entry
                    .handler
                    .execute_parsed(command, io, env)
                    .map_err(|error| ShellError::Handler {
                        name: command.name.clone(),
                        error,
                    })
            }
            None => Err(ShellError::UnknownCommand {
                name: command.name.clone(),
            }),
        };

        if let Err(err) = outcome {
            debug!("{err}");
            if !err.is_reported() {
                report(io, &err);
            }
            errors.push(err);
        }

        if env.should_exit {
            break;
        }
    }

    errors
}

fn report(io: &mut Io<'_>, err: &ShellError) {
    if let Err(e) = writeln!(io.err, "{err}") {
        error!("can't write error line: {e}");
    }
}

/// Returns true for the raw lines that end the read loop before any parsing happens.
pub fn is_exit_word(line: &str) -> bool {
    matches!(line.trim(), "exit" | "quit")
}

/// The interactive shell: owns the shell state and the command registry.
///
/// Example
/// ```
/// use sigyx::Interpreter;
/// use sigyx::command::Io;
///
/// let mut sh = Interpreter::default();
/// let (mut out, mut err) = (Vec::new(), Vec::new());
/// let errors = sh.run_line("echo hello world; nope", &mut Io::new(&mut out, &mut err));
/// assert_eq!(out, b"hello world\n");
/// assert_eq!(err, b"nope: not a command\n");
/// assert_eq!(errors.len(), 1);
/// ```
pub struct Interpreter {
    env: Environment,
    registry: Registry,
}

impl Interpreter {
    /// Create an interpreter around an already populated registry.
    pub fn new(registry: Registry) -> Self {
        Self {
            env: Environment::new(),
            registry,
        }
    }

    /// The built-in commands plus the aliases from `config`.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Registry::new();
        crate::builtin::register_builtins(&mut registry);
        config.apply_aliases(&mut registry);
        Self::new(registry)
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Parse and dispatch one input line.
    ///
    /// A syntax error is reported as a single `error: ...` line and nothing is executed.
    pub fn run_line(&mut self, line: &str, io: &mut Io<'_>) -> Vec<ShellError> {
        let parsed = match parser::parse(line) {
            Ok(parsed) => parsed,
            Err(e) => {
                let err = ShellError::from(e);
                debug!("{err}");
                report(io, &err);
                return vec![err];
            }
        };
        debug!("parsed = {:?}", parsed);
        dispatch(&self.registry, &parsed, &mut self.env, io)
    }

    /// Read-Eval-Print Loop.
    ///
    /// Ends on `exit`/`quit`, on Ctrl-C or Ctrl-D. Other line editor failures are returned.
    pub fn repl(&mut self, config: &Config) -> rustyline::Result<()> {
        let mut rl = DefaultEditor::new()?;
        info!("session started in {}", self.env.current_dir.display());

        while !self.env.should_exit {
            let readline = rl.readline(&config.render_prompt(&self.env.current_dir));
            match readline {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if config.history {
                        rl.add_history_entry(line.as_str())?;
                    }
                    if is_exit_word(&line) {
                        println!();
                        break;
                    }

                    let stdout = std::io::stdout();
                    let stderr = std::io::stderr();
                    let (mut out, mut err) = (stdout.lock(), stderr.lock());
                    self.run_line(&line, &mut Io::new(&mut out, &mut err));
                    out.flush()?;
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        info!("session ended");
        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the built-in commands:
    /// `cd`, `pwd`, `ls`, `cat`, `mkdir`, `rm`, `echo`, `cls`, `exit`, `help`.
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::from_fn;
    use crate::value::Value;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Registry whose handlers append `name:args` to a shared log.
    fn recording_registry(log: &Rc<RefCell<Vec<String>>>) -> Registry {
        let mut registry = Registry::new();
        for name in ["a", "b", "c"] {
            let log = Rc::clone(log);
            registry.register(
                name,
                from_fn(move |args: &[Value], _io: &mut Io<'_>, _env: &mut Environment| {
                    let args: Vec<String> = args.iter().map(Value::to_string).collect();
                    log.borrow_mut().push(format!("{name}:{}", args.join(",")));
                    Ok(())
                }),
                &[],
            );
        }
        registry.register("fail", from_fn(|_, _, _| Err(anyhow!("boom"))), &[]);
        registry.register(
            "stop",
            from_fn(|_, _, env| {
                env.should_exit = true;
                Ok(())
            }),
            &[],
        );
        registry
    }

    fn dispatch_line(registry: &Registry, line: &str) -> (Vec<ShellError>, String) {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let mut env = Environment::new();
        let parsed = parser::parse(line).unwrap();
        let errors = dispatch(registry, &parsed, &mut env, &mut Io::new(&mut out, &mut err));
        (errors, String::from_utf8(err).unwrap())
    }

    #[test]
    fn test_commands_run_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let registry = recording_registry(&log);

        let (errors, err) = dispatch_line(&registry, "b 1 2.5; a x ;c");
        assert!(errors.is_empty());
        assert!(err.is_empty());
        assert_eq!(*log.borrow(), vec!["b:1,2.5", "a:x", "c:"]);
    }

    #[test]
    fn test_unknown_command_does_not_stop_the_line() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let registry = recording_registry(&log);

        let (errors, err) = dispatch_line(&registry, "a; nope 1; b");
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], ShellError::UnknownCommand { name } if name == "nope"));
        assert_eq!(err, "nope: not a command\n");
        assert_eq!(*log.borrow(), vec!["a:", "b:"]);
    }

    #[test]
    fn test_failing_handler_is_tagged_and_contained() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let registry = recording_registry(&log);

        let (errors, err) = dispatch_line(&registry, "fail; c");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].command(), Some("fail"));
        assert_eq!(err, "fail: boom\n");
        assert_eq!(*log.borrow(), vec!["c:"]);
    }

    #[test]
    fn test_exit_flag_stops_the_line() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let registry = recording_registry(&log);

        let (errors, _) = dispatch_line(&registry, "a; stop; b");
        assert!(errors.is_empty());
        assert_eq!(*log.borrow(), vec!["a:"]);
    }

    #[test]
    fn test_empty_line_dispatches_nothing() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let registry = recording_registry(&log);

        let (errors, err) = dispatch_line(&registry, " ;; ");
        assert!(errors.is_empty());
        assert!(err.is_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_run_line_reports_syntax_errors() {
        let mut sh = Interpreter::default();
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let errors = sh.run_line("echo \"open", &mut Io::new(&mut out, &mut err));
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ShellError::Syntax(_)));
        assert!(out.is_empty());
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "error: unterminated quote at position 5\n"
        );
    }

    #[test]
    fn test_exit_words() {
        assert!(is_exit_word("exit"));
        assert!(is_exit_word("  quit \n"));
        assert!(!is_exit_word("exit now"));
        assert!(!is_exit_word("pwd; exit"));
    }

    #[test]
    fn test_exit_builtin_inside_a_line() {
        let mut sh = Interpreter::default();
        let (mut out, mut err) = (Vec::new(), Vec::new());
        sh.run_line("echo a; quit; echo b", &mut Io::new(&mut out, &mut err));
        assert_eq!(out, b"a\n");
        assert!(sh.env().should_exit);
    }
}
