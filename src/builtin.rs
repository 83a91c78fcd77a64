use crate::command::{Command, Io};
use crate::env::Environment;
use crate::error::Reported;
use crate::parser::ParsedCommand;
use crate::registry::Registry;
use crate::value::Value;
use anyhow::{Context, Result, anyhow};
use argh::{EarlyExit, FromArgs};
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;

/// Built-in commands known to the shell at compile time.
///
/// Builtins parse their options with the [`argh`] crate (`FromArgs`) from the plain text of
/// each argument value and execute directly in-process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "ls" or "cd".
    fn name() -> &'static str;

    /// Extra names the command answers to.
    fn aliases() -> &'static [&'static str] {
        &[]
    }

    /// Executes the command against the shell state.
    ///
    /// An `Err` becomes a `<name>: <message>` line printed by the dispatcher.
    fn execute(self, io: &mut Io<'_>, env: &mut Environment) -> Result<()>;
}

/// Adapter that turns a [`BuiltinCommand`] type into a registrable [`Command`].
pub(crate) struct Builtin<T> {
    _phantom: PhantomData<T>,
}

impl<T> Default for Builtin<T> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T: BuiltinCommand> Builtin<T> {
    fn run(&self, argv: &[String], io: &mut Io<'_>, env: &mut Environment) -> Result<()> {
        let argv: Vec<&str> = argv.iter().map(String::as_str).collect();
        match T::from_args(&[T::name()], &argv) {
            Ok(cmd) => cmd.execute(io, env),
            // `--help` lands here with a successful status.
            Err(EarlyExit {
                output,
                status: Ok(()),
            }) => {
                io.out.write_all(output.as_bytes())?;
                Ok(())
            }
            Err(EarlyExit {
                output,
                status: Err(()),
            }) => Err(anyhow!("{}", output.trim_end())),
        }
    }
}

impl<T: BuiltinCommand> Command for Builtin<T> {
    fn execute(&self, args: &[Value], io: &mut Io<'_>, env: &mut Environment) -> Result<()> {
        self.run(&to_argv(args, |_| false), io, env)
    }

    fn execute_parsed(
        &self,
        command: &ParsedCommand,
        io: &mut Io<'_>,
        env: &mut Environment,
    ) -> Result<()> {
        self.run(&to_argv(&command.args, |i| command.is_quoted(i)), io, env)
    }
}

/// Render typed arguments as the argument vector handed to argh.
///
/// Only the leading bare words starting with `-` are left as flags. A `--` always
/// follows them, so numbers, quoted strings and words such as `help` reach the command
/// as operands.
fn to_argv(args: &[Value], is_quoted: impl Fn(usize) -> bool) -> Vec<String> {
    let is_flag = |i: usize, arg: &Value| {
        !is_quoted(i) && arg.as_str().is_some_and(|s| s.starts_with('-') && s != "--")
    };
    let flags = args
        .iter()
        .enumerate()
        .take_while(|&(i, arg)| is_flag(i, arg))
        .count();

    let mut argv: Vec<String> = args[..flags].iter().map(Value::to_string).collect();
    argv.push("--".to_string());
    let mut operands = flags;
    if !is_quoted(flags) && args.get(flags).and_then(Value::as_str) == Some("--") {
        operands += 1;
    }
    argv.extend(args[operands..].iter().map(Value::to_string));
    argv
}

fn register<T: BuiltinCommand + 'static>(registry: &mut Registry) {
    registry.register(T::name(), Builtin::<T>::default(), T::aliases());
}

/// Register every built-in command.
///
/// Called once at startup, before the read loop begins. `help` is registered last so that
/// its listing covers everything else.
pub(crate) fn register_builtins(registry: &mut Registry) {
    register::<Cd>(registry);
    register::<Pwd>(registry);
    register::<Ls>(registry);
    register::<Cat>(registry);
    register::<Mkdir>(registry);
    register::<Rm>(registry);
    register::<Echo>(registry);
    register::<Clear>(registry);
    register::<Exit>(registry);

    let mut listing: Vec<(String, Vec<String>)> = registry
        .entries()
        .into_iter()
        .map(|entry| (entry.name.clone(), entry.aliases.clone()))
        .collect();
    listing.push(("help".to_string(), Vec::new()));
    listing.sort();
    registry.register("help", Help { listing }, &[]);
}

/// Fails with the conventional message when a command needs at least one operand.
fn require_operands(operands: &[String]) -> Result<()> {
    if operands.is_empty() {
        return Err(anyhow!("missing operand"));
    }
    Ok(())
}

/// Per-operand failures have already been printed; only the count travels on.
fn finish(failed: usize) -> Result<()> {
    if failed > 0 {
        return Err(Reported { failed }.into());
    }
    Ok(())
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _io: &mut Io<'_>, env: &mut Environment) -> Result<()> {
        let Some(target) = self.target else {
            return Err(anyhow!("missing operand"));
        };

        let new_dir = env.resolve(&target);
        let metadata = match fs::metadata(&new_dir) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(anyhow!("no such file or directory: {target}"));
            }
            Err(e) => return Err(e).with_context(|| format!("can't access {target}")),
        };
        if !metadata.is_dir() {
            return Err(anyhow!("not a directory: {target}"));
        }

        env.current_dir = fs::canonicalize(&new_dir)
            .with_context(|| format!("can't canonicalize {}", new_dir.display()))?;
        Ok(())
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(self, io: &mut Io<'_>, env: &mut Environment) -> Result<()> {
        writeln!(io.out, "{}", env.current_dir.display())?;
        Ok(())
    }
}

#[derive(FromArgs)]
/// List directory contents, directories marked with a trailing slash.
pub struct Ls {
    #[argh(positional)]
    /// directory to list; defaults to the current directory.
    pub path: Option<String>,
}

impl BuiltinCommand for Ls {
    fn name() -> &'static str {
        "ls"
    }

    fn execute(self, io: &mut Io<'_>, env: &mut Environment) -> Result<()> {
        let shown = self.path.as_deref().unwrap_or(".");
        let dir = env.resolve(shown);
        let read_dir = match fs::read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(anyhow!("cannot access '{shown}': No such file or directory"));
            }
            Err(e) => return Err(e).with_context(|| format!("cannot open directory '{shown}'")),
        };

        let mut names = Vec::new();
        for entry in read_dir {
            let entry = entry?;
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                name.push('/');
            }
            names.push(name);
        }
        names.sort();

        for name in names {
            writeln!(io.out, "{name}")?;
        }
        Ok(())
    }
}

#[derive(FromArgs)]
/// Print file(s) to standard output.
pub struct Cat {
    #[argh(positional, greedy)]
    /// files to print, in order.
    pub files: Vec<String>,
}

impl BuiltinCommand for Cat {
    fn name() -> &'static str {
        "cat"
    }

    fn execute(self, io: &mut Io<'_>, env: &mut Environment) -> Result<()> {
        require_operands(&self.files)?;
        let mut failed = 0;
        for fname in &self.files {
            match fs::read(env.resolve(fname)) {
                Ok(contents) => io.out.write_all(&contents)?,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    io.error(Self::name(), format!("{fname}: No such file"))?;
                    failed += 1;
                }
                Err(e) => {
                    io.error(Self::name(), format!("{fname}: {e}"))?;
                    failed += 1;
                }
            }
        }
        finish(failed)
    }
}

#[derive(FromArgs)]
/// Create directories.
pub struct Mkdir {
    #[argh(positional, greedy)]
    /// directories to create.
    pub dirs: Vec<String>,
}

impl BuiltinCommand for Mkdir {
    fn name() -> &'static str {
        "mkdir"
    }

    fn execute(self, io: &mut Io<'_>, env: &mut Environment) -> Result<()> {
        require_operands(&self.dirs)?;
        let mut failed = 0;
        for dir in &self.dirs {
            let message = match fs::create_dir(env.resolve(dir)) {
                Ok(()) => continue,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    format!("cannot create directory '{dir}': File exists")
                }
                Err(e) => format!("cannot create directory '{dir}': {e}"),
            };
            io.error(Self::name(), message)?;
            failed += 1;
        }
        finish(failed)
    }
}

#[derive(FromArgs)]
/// Remove files or empty directories.
pub struct Rm {
    #[argh(positional, greedy)]
    /// files or empty directories to remove.
    pub paths: Vec<String>,
}

impl BuiltinCommand for Rm {
    fn name() -> &'static str {
        "rm"
    }

    fn execute(self, io: &mut Io<'_>, env: &mut Environment) -> Result<()> {
        require_operands(&self.paths)?;
        let mut failed = 0;
        for operand in &self.paths {
            let path = env.resolve(operand);
            let removed = fs::symlink_metadata(&path).and_then(|metadata| {
                if metadata.is_dir() {
                    fs::remove_dir(&path)
                } else {
                    fs::remove_file(&path)
                }
            });
            let reason = match removed {
                Ok(()) => continue,
                Err(e) if e.kind() == ErrorKind::NotFound => "No such file or directory".to_string(),
                Err(e) if e.kind() == ErrorKind::DirectoryNotEmpty => {
                    "Directory not empty".to_string()
                }
                Err(e) => e.to_string(),
            };
            io.error(Self::name(), format!("cannot remove '{operand}': {reason}"))?;
            failed += 1;
        }
        finish(failed)
    }
}

#[derive(FromArgs)]
/// write the arguments to standard output, separated by spaces.
/// by default, a trailing newline is printed.
pub struct Echo {
    #[argh(switch, short = 'n')]
    /// do not output the trailing newline.
    pub no_newline: bool,

    #[argh(positional, greedy)]
    /// values to print as-is, separated by spaces.
    pub args: Vec<String>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(self, io: &mut Io<'_>, _env: &mut Environment) -> Result<()> {
        let s = self.args.join(" ");
        if self.no_newline {
            write!(io.out, "{}", s)?;
        } else {
            writeln!(io.out, "{}", s)?;
        }
        Ok(())
    }
}

#[derive(FromArgs)]
/// Clear the terminal screen.
pub struct Clear {}

impl BuiltinCommand for Clear {
    fn name() -> &'static str {
        "cls"
    }

    fn aliases() -> &'static [&'static str] {
        &["clear"]
    }

    fn execute(self, io: &mut Io<'_>, _env: &mut Environment) -> Result<()> {
        // Erase the display, then home the cursor.
        io.out.write_all(b"\x1b[2J\x1b[H")?;
        io.out.flush()?;
        Ok(())
    }
}

#[derive(FromArgs)]
/// Leave the shell after the current command.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn aliases() -> &'static [&'static str] {
        &["quit"]
    }

    fn execute(self, _io: &mut Io<'_>, env: &mut Environment) -> Result<()> {
        env.should_exit = true;
        Ok(())
    }
}

/// Lists the commands that were registered at startup.
struct Help {
    listing: Vec<(String, Vec<String>)>,
}

impl Command for Help {
    fn execute(&self, _args: &[Value], io: &mut Io<'_>, _env: &mut Environment) -> Result<()> {
        for (name, aliases) in &self.listing {
            if aliases.is_empty() {
                writeln!(io.out, "{name}")?;
            } else {
                writeln!(io.out, "{name} ({})", aliases.join(", "))?;
            }
        }
        writeln!(io.out, "Run `<command> --help` for details.")?;
        Ok(())
    }
}
