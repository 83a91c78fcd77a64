//! User configuration, read from a TOML file at startup.
//!
//! ```toml
//! prompt = "{cwd} λ "
//! history = true
//!
//! [aliases]
//! dir = "ls"
//! ```

use crate::registry::Registry;
use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Placeholder in the prompt template that is replaced by the working directory.
const CWD_PLACEHOLDER: &str = "{cwd}";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Prompt template; `{cwd}` expands to the current directory.
    pub prompt: String,
    /// Keep an in-memory history in the line editor. Nothing is written to disk.
    pub history: bool,
    /// Extra names for existing commands, alias -> command.
    pub aliases: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: format!("{CWD_PLACEHOLDER} λ "),
            history: true,
            aliases: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is tried and a
    /// missing file simply means default settings.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::read(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::read(&path),
            _ => Ok(Self::default()),
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("can't read config {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// `$XDG_CONFIG_HOME/sigyx/config.toml`, falling back to `$HOME/.config/sigyx/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;
        Some(base.join("sigyx").join("config.toml"))
    }

    pub fn render_prompt(&self, cwd: &Path) -> String {
        self.prompt
            .replace(CWD_PLACEHOLDER, &cwd.display().to_string())
    }

    /// Register the configured aliases. Aliases pointing at unknown commands are skipped.
    ///
    /// Returns the aliases that could not be applied.
    pub fn apply_aliases(&self, registry: &mut Registry) -> Vec<String> {
        let mut skipped = Vec::new();
        for (alias, target) in &self.aliases {
            if !registry.alias(alias, target) {
                warn!("alias {alias}: unknown command {target}");
                skipped.push(alias.clone());
            }
        }
        skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::from_fn;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml(
            r#"
            prompt = "sigyx> "
            history = false

            [aliases]
            dir = "ls"
            "#,
        )
        .unwrap();
        assert_eq!(config.prompt, "sigyx> ");
        assert!(!config.history);
        assert_eq!(config.aliases.get("dir").map(String::as_str), Some("ls"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(Config::from_toml("promt = \"x\"").is_err());
    }

    #[test]
    fn test_render_prompt() {
        let config = Config::default();
        assert_eq!(config.render_prompt(Path::new("/tmp")), "/tmp λ ");

        let config = Config {
            prompt: "[{cwd}] ".to_string(),
            ..Config::default()
        };
        assert_eq!(config.render_prompt(Path::new("/a")), "[/a] ");
    }

    #[test]
    fn test_apply_aliases_skips_unknown_targets() {
        let mut registry = Registry::new();
        registry.register("ls", from_fn(|_, _, _| Ok(())), &[]);

        let mut config = Config::default();
        config.aliases.insert("dir".to_string(), "ls".to_string());
        config.aliases.insert("x".to_string(), "missing".to_string());

        assert_eq!(config.apply_aliases(&mut registry), vec!["x".to_string()]);
        assert!(registry.contains("dir"));
        assert!(!registry.contains("x"));
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let path = std::env::temp_dir().join(format!("sigyx_no_config_{}.toml", std::process::id()));
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("sigyx_config_{}.toml", std::process::id()));
        std::fs::write(&path, "prompt = \"$ \"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.prompt, "$ ");
        assert!(config.history);
        let _ = std::fs::remove_file(&path);
    }
}
