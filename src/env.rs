use std::env as stdenv;
use std::path::{Path, PathBuf};

/// Mutable shell state shared by every command of a session.
///
/// The environment contains:
/// - `current_dir`: the working directory relative paths are resolved against.
/// - `should_exit`: a flag the read loop checks to know when to terminate.
///
/// A single instance lives as long as the interpreter; commands mutate it in place.
#[derive(Debug, Clone)]
pub struct Environment {
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// When set to true, indicates that the read loop should exit.
    pub should_exit: bool,
}

impl Environment {
    /// Start in the working directory of the process.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_dir(current_dir)
    }

    /// Start in the given directory.
    pub fn with_dir(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: current_dir.into(),
            should_exit: false,
        }
    }

    /// Resolve a user-supplied path against the current directory.
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.current_dir.join(path)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
