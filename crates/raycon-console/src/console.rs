//! The console prompt: input line, output log, history and autocomplete.
//!
//! The host forwards [`ConsoleEvent`]s and draws [`Console::input`],
//! [`Console::output`] and [`Console::suggestions`] however it likes.

use std::collections::VecDeque;

use raycon_types::config::ConsoleConfig;
use raycon_types::error::Result;
use raycon_types::input::ConsoleEvent;

use crate::autoexec::{AutoexecManager, AutoexecStatus, strip_watch};
use crate::command::Command;
use crate::dictionary::CommandId;
use crate::history::History;
use crate::interpreter::CommandManager;

pub struct Console {
    manager: CommandManager,
    history: History,
    autoexec: AutoexecManager,
    config: ConsoleConfig,
    input: String,
    output: VecDeque<String>,
    /// Lines at the back of `output` not yet returned by `take_unread`.
    unread: usize,
    /// The input the current suggestion list was computed for.
    suggestion_prefix: String,
    command_matches: Vec<CommandId>,
    /// Index of the suggestion last applied by `Complete`.
    completion: Option<usize>,
    shut_down: bool,
}

impl Console {
    /// A console with the built-in commands registered.
    pub fn new(config: ConsoleConfig) -> Self {
        Self {
            manager: CommandManager::with_builtins(),
            history: History::new(config.history_size),
            autoexec: AutoexecManager::new(),
            output: VecDeque::with_capacity(config.max_output_lines),
            config,
            unread: 0,
            input: String::new(),
            suggestion_prefix: String::new(),
            command_matches: Vec::new(),
            completion: None,
            shut_down: false,
        }
    }

    /// Register a command. Returns false if the name was rejected.
    pub fn add_command(&mut self, cmd: Box<dyn Command>) -> bool {
        self.manager.add_command(cmd)
    }

    /// The interpreter behind the prompt.
    pub fn manager(&self) -> &CommandManager {
        &self.manager
    }

    /// Submitted statements, newest first.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Settings the console was created with.
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Current contents of the input line.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Output log, oldest line first.
    pub fn output(&self) -> impl Iterator<Item = &str> {
        self.output.iter().map(String::as_str)
    }

    /// Lines appended since the last call, oldest first.
    pub fn take_unread(&mut self) -> impl Iterator<Item = &str> {
        let start = self.output.len() - self.unread;
        self.unread = 0;
        self.output.iter().skip(start).map(String::as_str)
    }

    /// Replay the configured autoexec script.
    pub fn load_autoexec(&mut self) -> Result<AutoexecStatus> {
        self.autoexec
            .parse_autoexec(&self.config.autoexec_path, &self.manager)
    }

    /// Watch `name` so its value is saved to the autoexec script.
    pub fn watch(&mut self, name: &str) -> bool {
        self.autoexec.add_watch(&self.manager, name)
    }

    /// Stop watching `name`.
    pub fn unwatch(&mut self, name: &str) -> bool {
        self.autoexec.remove_watch(name)
    }

    /// Watched names and their current values.
    pub fn watches(&self) -> Vec<(String, String)> {
        self.autoexec.watches(&self.manager)
    }

    /// Apply one input event.
    pub fn handle_event(&mut self, event: ConsoleEvent) {
        match event {
            ConsoleEvent::Char(c) => {
                self.input.push(c);
                self.refresh_suggestions();
            },
            ConsoleEvent::Backspace => {
                self.input.pop();
                self.refresh_suggestions();
            },
            ConsoleEvent::Submit => {
                let text = std::mem::take(&mut self.input);
                self.execute(&text);
            },
            ConsoleEvent::Complete => self.complete(),
            ConsoleEvent::HistoryPrevious => {
                if let Some(entry) = self.history.previous() {
                    self.input = entry.to_string();
                    self.clear_suggestions();
                }
            },
            ConsoleEvent::HistoryNext => {
                if let Some(entry) = self.history.next() {
                    self.input = entry.to_string();
                    self.clear_suggestions();
                }
            },
            ConsoleEvent::Clear => {
                self.output.clear();
                self.unread = 0;
            },
        }
    }

    /// Execute a statement as if it had been typed and submitted.
    ///
    /// A leading `watch ` also watches the statement's name.
    pub fn execute(&mut self, text: &str) {
        self.clear_suggestions();
        self.history.reset_cursor();
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.push_output(format!("> {text}"));
        self.history.add_if_needed(text);

        let (watched, statement) = strip_watch(text);
        match self.manager.execute(statement) {
            Ok(execution) => {
                if watched && self.autoexec.add_watch(&self.manager, &execution.name) {
                    self.push_output(format!("watching {}", execution.name));
                }
                self.autoexec.record_execution(&execution);
                for line in execution.output.lines() {
                    self.push_output(line.to_string());
                }
            },
            Err(e) => self.push_output(format!("error: {e}")),
        }
    }

    /// History entries first, then command names, capped at
    /// `max_suggestions`.
    pub fn suggestions(&self) -> Vec<String> {
        let history = self
            .history
            .matches(&self.suggestion_prefix)
            .into_iter()
            .map(str::to_string);
        let registry = self.manager.registry();
        let commands = self
            .command_matches
            .iter()
            .filter_map(|&id| registry.get(id))
            .map(|cmd| cmd.name().to_string());
        history
            .chain(commands)
            .take(self.config.max_suggestions)
            .collect()
    }

    /// Flush autoexec if configured. Runs once; later calls return true.
    pub fn shutdown(&mut self) -> bool {
        if self.shut_down {
            return true;
        }
        self.shut_down = true;
        if !self.config.write_autoexec_on_exit {
            return true;
        }
        self.autoexec
            .write_autoexec(&self.config.autoexec_path, &self.manager)
    }

    fn push_output(&mut self, line: String) {
        if self.config.max_output_lines == 0 {
            return;
        }
        while self.output.len() >= self.config.max_output_lines {
            self.output.pop_front();
        }
        self.output.push_back(line);
        self.unread = (self.unread + 1).min(self.output.len());
    }

    fn clear_suggestions(&mut self) {
        self.suggestion_prefix.clear();
        self.command_matches.clear();
        self.completion = None;
    }

    fn refresh_suggestions(&mut self) {
        self.completion = None;
        let prefix = self.input.trim_start().to_string();
        if prefix.is_empty() {
            self.clear_suggestions();
            return;
        }
        let registry = self.manager.registry();
        if !self.suggestion_prefix.is_empty() && prefix.starts_with(&self.suggestion_prefix) {
            registry.trim_suggestions(&mut self.command_matches, &prefix);
        } else {
            self.command_matches = registry.match_ids(&prefix);
        }
        self.suggestion_prefix = prefix;
    }

    fn complete(&mut self) {
        let suggestions = self.suggestions();
        if suggestions.is_empty() {
            return;
        }
        let next = self
            .completion
            .map_or(0, |i| (i + 1) % suggestions.len());
        self.completion = Some(next);
        self.input.clone_from(&suggestions[next]);
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::argument::Argument;
    use crate::command::{CallMethod, GetSet, VariableSlot};

    fn console(config: ConsoleConfig) -> (Console, VariableSlot<f32>) {
        let speed = VariableSlot::new(1.0f32);
        let mut c = Console::new(ConsoleConfig {
            write_autoexec_on_exit: false,
            ..config
        });
        c.add_command(Box::new(GetSet::new("Speed", speed.clone())));
        for name in ["SetSpeed", "SetColor", "Get"] {
            c.add_command(Box::new(CallMethod::new(name, |_| Ok(Argument::none()))));
        }
        (c, speed)
    }

    fn type_text(c: &mut Console, text: &str) {
        for ch in text.chars() {
            c.handle_event(ConsoleEvent::Char(ch));
        }
    }

    #[test]
    fn submit_executes_and_logs() {
        let (mut c, speed) = console(ConsoleConfig::default());
        type_text(&mut c, "Speed(2)");
        c.handle_event(ConsoleEvent::Submit);
        assert_eq!(speed.get(), 2.0);
        assert_eq!(c.input(), "");
        let log: Vec<&str> = c.output().collect();
        assert_eq!(log, ["> Speed(2)", "Speed = 2.0"]);
        assert_eq!(c.history().entries().next(), Some("Speed(2)"));
    }

    #[test]
    fn parse_errors_are_shown() {
        let (mut c, _) = console(ConsoleConfig::default());
        c.execute("Speed(2");
        let last = c.output().last().unwrap();
        assert!(last.starts_with("error: unterminated parenthesis"));
    }

    #[test]
    fn suggestions_filter_as_you_type() {
        let (mut c, _) = console(ConsoleConfig::default());
        type_text(&mut c, "Set");
        assert_eq!(c.suggestions(), ["SetSpeed", "SetColor"]);
        type_text(&mut c, "S");
        assert_eq!(c.suggestions(), ["SetSpeed"]);
        c.handle_event(ConsoleEvent::Backspace);
        assert_eq!(c.suggestions(), ["SetSpeed", "SetColor"]);
        type_text(&mut c, "x");
        assert!(c.suggestions().is_empty());
    }

    #[test]
    fn history_suggestions_come_first_and_are_capped() {
        let (mut c, _) = console(ConsoleConfig {
            max_suggestions: 2,
            ..ConsoleConfig::default()
        });
        c.execute("SetColor(1, 0, 0)");
        type_text(&mut c, "Set");
        assert_eq!(c.suggestions(), ["SetColor(1, 0, 0)", "SetSpeed"]);
    }

    #[test]
    fn complete_cycles_through_suggestions() {
        let (mut c, _) = console(ConsoleConfig::default());
        type_text(&mut c, "Se");
        c.handle_event(ConsoleEvent::Complete);
        assert_eq!(c.input(), "SetSpeed");
        c.handle_event(ConsoleEvent::Complete);
        assert_eq!(c.input(), "SetColor");
        c.handle_event(ConsoleEvent::Complete);
        assert_eq!(c.input(), "SetSpeed");
    }

    #[test]
    fn history_navigation_fills_input() {
        let (mut c, _) = console(ConsoleConfig::default());
        c.execute("Speed(1)");
        c.execute("Speed(2)");
        c.handle_event(ConsoleEvent::HistoryPrevious);
        assert_eq!(c.input(), "Speed(2)");
        c.handle_event(ConsoleEvent::HistoryPrevious);
        assert_eq!(c.input(), "Speed(1)");
        c.handle_event(ConsoleEvent::HistoryNext);
        assert_eq!(c.input(), "Speed(2)");
    }

    #[test]
    fn output_log_is_bounded_and_clearable() {
        let (mut c, _) = console(ConsoleConfig {
            max_output_lines: 3,
            ..ConsoleConfig::default()
        });
        c.execute("Speed(1)");
        c.execute("Speed(2)");
        let log: Vec<&str> = c.output().collect();
        assert_eq!(log, ["Speed = 1.0", "> Speed(2)", "Speed = 2.0"]);
        c.handle_event(ConsoleEvent::Clear);
        assert_eq!(c.output().count(), 0);
        assert_eq!(c.take_unread().count(), 0);
    }

    #[test]
    fn take_unread_returns_new_lines_once() {
        let (mut c, _) = console(ConsoleConfig {
            max_output_lines: 3,
            ..ConsoleConfig::default()
        });
        c.execute("Speed(1)");
        assert_eq!(c.take_unread().collect::<Vec<_>>(), ["> Speed(1)", "Speed = 1.0"]);
        assert_eq!(c.take_unread().count(), 0);
        c.execute("Speed(2)");
        c.execute("Speed(3)");
        assert_eq!(
            c.take_unread().collect::<Vec<_>>(),
            ["Speed = 2.0", "> Speed(3)", "Speed = 3.0"]
        );
    }

    #[test]
    fn watch_prefix_at_the_prompt() {
        let (mut c, _) = console(ConsoleConfig::default());
        c.execute("watch Speed(3)");
        assert_eq!(c.watches(), [("Speed".to_string(), "3.0".to_string())]);
        assert!(c.unwatch("Speed"));
        assert!(c.watches().is_empty());
    }

    #[test]
    fn shutdown_flushes_autoexec_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoexec.cfg");
        fs::write(&path, "// settings\nwatch Speed(1.0)\n").unwrap();
        let speed = VariableSlot::new(1.0f32);
        let mut c = Console::new(ConsoleConfig {
            autoexec_path: path.clone(),
            ..ConsoleConfig::default()
        });
        c.add_command(Box::new(GetSet::new("Speed", speed.clone())));
        c.load_autoexec().unwrap();

        c.execute("Speed(2.5)");
        assert!(c.shutdown());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "// settings\nwatch Speed(2.5)\n"
        );

        speed.set(9.0);
        drop(c);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "// settings\nwatch Speed(2.5)\n"
        );
    }

    #[test]
    fn drop_flushes_when_not_shut_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoexec.cfg");
        fs::write(&path, "watch Speed(1.0)\n").unwrap();
        let speed = VariableSlot::new(1.0f32);
        {
            let mut c = Console::new(ConsoleConfig {
                autoexec_path: path.clone(),
                ..ConsoleConfig::default()
            });
            c.add_command(Box::new(GetSet::new("Speed", speed.clone())));
            c.load_autoexec().unwrap();
            speed.set(4.0);
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "watch Speed(4.0)\n");
    }
}
