//! Name and alias lookup table for command handlers.
//!
//! The registry is filled once during startup and only read afterwards: the dispatcher
//! borrows it immutably for the whole read loop.

use crate::command::Command;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// A registered handler together with the names it was registered under.
pub struct Entry {
    pub name: String,
    pub aliases: Vec<String>,
    pub handler: Box<dyn Command>,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

/// Mapping from command names and aliases to handlers.
///
/// Every key points at a shared [`Entry`], so a name and its aliases resolve to the very
/// same handler.
#[derive(Debug, Default)]
pub struct Registry {
    table: HashMap<String, Rc<Entry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name` and every alias.
    ///
    /// Keys that already exist are overwritten: the last registration wins.
    pub fn register(&mut self, name: &str, handler: impl Command + 'static, aliases: &[&str]) {
        let entry = Rc::new(Entry {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            handler: Box::new(handler),
        });
        debug!("registering {name} (aliases: {aliases:?})");
        for key in std::iter::once(name).chain(aliases.iter().copied()) {
            self.insert(key, Rc::clone(&entry));
        }
    }

    /// Make `alias` resolve to whatever `target` currently resolves to.
    ///
    /// Returns `false` and leaves the table untouched when `target` is unknown.
    pub fn alias(&mut self, alias: &str, target: &str) -> bool {
        let Some(entry) = self.table.get(target).cloned() else {
            return false;
        };
        debug!("aliasing {alias} -> {}", entry.name);
        self.insert(alias, entry);
        true
    }

    fn insert(&mut self, key: &str, entry: Rc<Entry>) {
        if let Some(previous) = self.table.insert(key.to_string(), entry) {
            debug!("{key} no longer resolves to {}", previous.name);
        }
    }

    /// Find the handler registered under a name or alias.
    pub fn lookup(&self, name: &str) -> Option<&Entry> {
        self.table.get(name).map(Rc::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Number of names and aliases that resolve to a handler.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Distinct entries still reachable through at least one key, sorted by primary name.
    pub fn entries(&self) -> Vec<&Entry> {
        let mut seen = HashSet::new();
        let mut entries: Vec<&Entry> = self
            .table
            .values()
            .filter(|entry| seen.insert(Rc::as_ptr(entry)))
            .map(Rc::as_ref)
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{from_fn, Io};
    use crate::env::Environment;
    use crate::value::Value;
    use std::io::Write;

    fn noop() -> impl Command {
        from_fn(|_, _, _| Ok(()))
    }

    fn printer(text: &'static str) -> impl Command {
        from_fn(move |_, io, _| {
            write!(io.out, "{text}")?;
            Ok(())
        })
    }

    fn run(registry: &Registry, name: &str) -> String {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let mut env = Environment::new();
        registry
            .lookup(name)
            .unwrap()
            .handler
            .execute(&[] as &[Value], &mut Io::new(&mut out, &mut err), &mut env)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_alias_resolves_to_same_handler() {
        let mut registry = Registry::new();
        registry.register("cls", noop(), &["clear"]);

        let by_name = registry.lookup("cls").unwrap();
        let by_alias = registry.lookup("clear").unwrap();
        assert!(std::ptr::eq(by_name, by_alias));
        assert_eq!(by_alias.name, "cls");
        assert_eq!(by_alias.aliases, vec!["clear".to_string()]);
    }

    #[test]
    fn test_unknown_name_is_absent() {
        let mut registry = Registry::new();
        registry.register("ls", noop(), &[]);
        assert!(registry.lookup("sl").is_none());
        assert!(!registry.contains("sl"));
        assert!(registry.contains("ls"));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = Registry::new();
        registry.register("greet", printer("first"), &["hi"]);
        registry.register("hello", printer("second"), &["hi"]);

        assert_eq!(run(&registry, "greet"), "first");
        assert_eq!(run(&registry, "hi"), "second");
        assert_eq!(run(&registry, "hello"), "second");

        registry.register("greet", printer("third"), &[]);
        assert_eq!(run(&registry, "greet"), "third");
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_alias_to_existing_entry() {
        let mut registry = Registry::new();
        registry.register("ls", printer("listing"), &[]);

        assert!(registry.alias("dir", "ls"));
        assert!(!registry.alias("nope", "missing"));
        assert!(!registry.contains("nope"));
        assert!(std::ptr::eq(
            registry.lookup("dir").unwrap(),
            registry.lookup("ls").unwrap()
        ));
        assert_eq!(run(&registry, "dir"), "listing");
    }

    #[test]
    fn test_entries_are_distinct_and_sorted() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        registry.register("pwd", noop(), &[]);
        registry.register("cls", noop(), &["clear"]);
        registry.register("exit", noop(), &["quit"]);

        let names: Vec<&str> = registry.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["cls", "exit", "pwd"]);
        assert_eq!(registry.len(), 5);
    }
}
