//! Autocomplete index over registered command names.
//!
//! Names are bucketed into chapters by their lowercased first character.
//! Within a chapter, entries keep registration order and comparisons are
//! case-sensitive.

use std::collections::HashMap;

/// Stable handle to a registered command (its registration index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(pub(crate) usize);

impl CommandId {
    /// Registration index of the command.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct Dictionary {
    names: Vec<String>,
    chapters: HashMap<char, Vec<CommandId>>,
}

fn chapter_key(text: &str) -> Option<char> {
    text.chars().next().map(|c| c.to_ascii_lowercase())
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `name` under the next id. Returns the id it was given.
    pub(crate) fn insert(&mut self, name: &str) -> CommandId {
        let id = CommandId(self.names.len());
        self.names.push(name.to_string());
        if let Some(key) = chapter_key(name) {
            self.chapters.entry(key).or_default().push(id);
        }
        id
    }

    /// Name registered under `id`.
    pub fn name(&self, id: CommandId) -> Option<&str> {
        self.names.get(id.0).map(String::as_str)
    }

    fn chapter(&self, text: &str) -> &[CommandId] {
        chapter_key(text)
            .and_then(|key| self.chapters.get(&key))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn has_prefix(&self, id: CommandId, prefix: &str) -> bool {
        self.name(id).is_some_and(|name| name.starts_with(prefix))
    }

    /// Exact lookup.
    pub fn find(&self, text: &str) -> Option<CommandId> {
        self.chapter(text)
            .iter()
            .copied()
            .find(|&id| self.name(id) == Some(text))
    }

    /// Every entry in the chapter whose name starts with `prefix`, in
    /// registration order. An empty prefix matches nothing.
    pub fn matches(&self, prefix: &str) -> Vec<CommandId> {
        self.chapter(prefix)
            .iter()
            .copied()
            .filter(|&id| self.has_prefix(id, prefix))
            .collect()
    }

    /// Narrow a previous [`Dictionary::matches`] result to a longer prefix
    /// without rescanning, keeping the survivors' order.
    pub fn trim_suggestions(&self, suggestions: &mut Vec<CommandId>, prefix: &str) {
        suggestions.retain(|&id| self.has_prefix(id, prefix));
    }

    /// Number of names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when no names are stored.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
