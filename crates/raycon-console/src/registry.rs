//! Command registry: owns every registered command and its dictionary entry.

use crate::command::Command;
use crate::dictionary::{CommandId, Dictionary};

/// Prefix reserved by the autoexec script format.
pub const WATCH_KEYWORD: &str = "watch";

/// Whether `name` may be registered: ASCII letter or `_` first, then ASCII
/// alphanumerics or `_`. The autoexec keyword is reserved.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name != WATCH_KEYWORD
}

/// Registry of available commands.
///
/// Commands are owned for the lifetime of the registry and never replaced.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
    dictionary: Dictionary,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Returns false (dropping the command) when the
    /// name is invalid or already taken.
    pub fn add_command(&mut self, cmd: Box<dyn Command>) -> bool {
        let name = cmd.name();
        if !is_valid_name(name) {
            log::warn!("Rejected console command with invalid name {name:?}");
            return false;
        }
        if self.dictionary.find(name).is_some() {
            log::warn!("Rejected duplicate console command {name}");
            return false;
        }
        let id = self.dictionary.insert(name);
        debug_assert_eq!(id.index(), self.commands.len());
        self.commands.push(cmd);
        true
    }

    /// Command registered under `id`.
    pub fn get(&self, id: CommandId) -> Option<&dyn Command> {
        self.commands.get(id.index()).map(Box::as_ref)
    }

    /// Id of the command named exactly `name`.
    pub fn find_id(&self, name: &str) -> Option<CommandId> {
        self.dictionary.find(name)
    }

    /// Exact, case-sensitive lookup.
    pub fn find(&self, name: &str) -> Option<&dyn Command> {
        self.find_id(name).and_then(|id| self.get(id))
    }

    /// Like [`CommandRegistry::find`], restricted to variable-backed commands.
    pub fn find_variable(&self, name: &str) -> Option<&dyn Command> {
        self.find(name).filter(|cmd| cmd.is_variable())
    }

    /// Commands whose names start with `prefix`, in registration order.
    pub fn matches(&self, prefix: &str) -> Vec<&dyn Command> {
        self.match_ids(prefix)
            .into_iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Ids of commands whose names start with `prefix`.
    pub fn match_ids(&self, prefix: &str) -> Vec<CommandId> {
        self.dictionary.matches(prefix)
    }

    /// Narrow previously matched ids to a longer prefix.
    pub fn trim_suggestions(&self, suggestions: &mut Vec<CommandId>, prefix: &str) {
        self.dictionary.trim_suggestions(suggestions, prefix);
    }

    /// All commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Command> {
        self.commands.iter().map(Box::as_ref)
    }

    /// All variable-backed commands in registration order.
    pub fn variables(&self) -> impl Iterator<Item = &dyn Command> {
        self.iter().filter(|cmd| cmd.is_variable())
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True when no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::Argument;
    use crate::command::{CallMethod, GetSet, VariableSlot};

    fn noop(name: &str) -> Box<dyn Command> {
        Box::new(CallMethod::new(name, |_| Ok(Argument::none())))
    }

    #[test]
    fn valid_names() {
        assert!(is_valid_name("SetSpeed"));
        assert!(is_valid_name("_debug2"));
        assert!(is_valid_name("r"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("2fast"));
        assert!(!is_valid_name("Set Speed"));
        assert!(!is_valid_name("Set(Speed)"));
        assert!(!is_valid_name("speed-up"));
        assert!(!is_valid_name("watch"));
    }

    #[test]
    fn add_and_find() {
        let mut reg = CommandRegistry::new();
        assert!(reg.add_command(noop("Reset")));
        assert_eq!(reg.find("Reset").unwrap().name(), "Reset");
        assert!(reg.find("reset").is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn duplicate_is_rejected() {
        let mut reg = CommandRegistry::new();
        assert!(reg.add_command(noop("Reset")));
        assert!(!reg.add_command(noop("Reset")));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn invalid_name_is_rejected() {
        let mut reg = CommandRegistry::new();
        assert!(!reg.add_command(noop("bad name")));
        assert!(reg.is_empty());
    }

    #[test]
    fn matches_in_registration_order() {
        let mut reg = CommandRegistry::new();
        reg.add_command(noop("SetSpeed"));
        reg.add_command(noop("SetColor"));
        reg.add_command(noop("Get"));
        let names: Vec<&str> = reg.matches("Set").iter().map(|c| c.name()).collect();
        assert_eq!(names, ["SetSpeed", "SetColor"]);
        let again: Vec<&str> = reg.matches("Set").iter().map(|c| c.name()).collect();
        assert_eq!(names, again);
    }

    #[test]
    fn find_variable_only_returns_variables() {
        let mut reg = CommandRegistry::new();
        reg.add_command(Box::new(GetSet::new("Speed", VariableSlot::new(1.0f32))));
        reg.add_command(noop("Reset"));
        assert!(reg.find_variable("Speed").is_some());
        assert!(reg.find_variable("Reset").is_none());
        assert_eq!(reg.variables().count(), 1);
    }

    #[test]
    fn trim_via_registry() {
        let mut reg = CommandRegistry::new();
        reg.add_command(noop("SetSpeed"));
        reg.add_command(noop("SetSamples"));
        let mut ids = reg.match_ids("Set");
        reg.trim_suggestions(&mut ids, "SetSp");
        assert_eq!(ids.len(), 1);
        assert_eq!(reg.get(ids[0]).unwrap().name(), "SetSpeed");
    }
}
