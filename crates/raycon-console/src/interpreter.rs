//! The command manager: parses statements and dispatches them to commands.

use raycon_types::error::{CommandError, ParseError, Result};

use crate::argument::Argument;
use crate::builtins;
use crate::command::Command;
use crate::parser::{self, Resolver, Statement, StatementForm};
use crate::registry::CommandRegistry;

/// What one executed statement did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// The command name as written.
    pub name: String,
    /// The unevaluated argument text (`"a,b"` for `name(a,b)`).
    pub arguments: String,
    pub form: StatementForm,
    /// Display text of the result or of the failure.
    pub output: String,
    /// False when the command was unknown or rejected its arguments.
    pub succeeded: bool,
}

/// Owns the command registry and runs statements against it.
#[derive(Default)]
pub struct CommandManager {
    registry: CommandRegistry,
}

impl CommandManager {
    /// An interpreter with no commands at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// An interpreter with `Help`, `Print` and `Dump` registered.
    pub fn with_builtins() -> Self {
        let mut manager = Self::new();
        builtins::register_builtins(&mut manager);
        manager
    }

    /// Register a command. Returns false if its name is invalid or taken.
    pub fn add_command(&mut self, cmd: Box<dyn Command>) -> bool {
        self.registry.add_command(cmd)
    }

    /// Registry of available commands.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Command named exactly `name`.
    pub fn get_command(&self, name: &str) -> Option<&dyn Command> {
        self.registry.find(name)
    }

    /// Only variable-backed commands qualify.
    pub fn get_variable(&self, name: &str) -> Option<&dyn Command> {
        self.registry.find_variable(name)
    }

    /// Commands whose name starts with `prefix`.
    pub fn match_prefix(&self, prefix: &str) -> Vec<&dyn Command> {
        self.registry.matches(prefix)
    }

    fn is_force_string(&self, name: &str) -> bool {
        self.registry
            .find(name)
            .is_some_and(|cmd| cmd.force_string_arguments())
    }

    fn run(&self, statement: &Statement) -> std::result::Result<Argument, CommandError> {
        let cmd = self
            .registry
            .find(&statement.name)
            .ok_or_else(|| CommandError::UnknownCommand(statement.name.clone()))?;
        let args = statement.args.evaluate(self)?;
        cmd.execute(args, &self.registry)
    }

    /// Execute one statement.
    ///
    /// Only malformed syntax is an `Err`. Unknown commands and rejected
    /// arguments come back as an [`Execution`] with `succeeded == false` and
    /// the message in `output`.
    pub fn execute(&self, text: &str) -> std::result::Result<Execution, ParseError> {
        let text = text.trim();
        let statement = parser::parse_statement(text, &|name: &str| self.is_force_string(name))?;
        let (output, succeeded) = match self.run(&statement) {
            Ok(value) => (value.to_string(), true),
            Err(e) => (e.to_string(), false),
        };
        log::debug!("{text} -> {output}");
        Ok(Execution {
            name: statement.name,
            arguments: statement.arguments_text,
            form: statement.form,
            output,
            succeeded,
        })
    }

    /// Execute one statement and return the text to display. Blank input
    /// displays nothing.
    pub fn execute_command(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        Ok(self.execute(text)?.output)
    }
}

impl Resolver for CommandManager {
    fn variable(&self, name: &str) -> Option<Argument> {
        self.registry.find_variable(name).and_then(|cmd| cmd.value())
    }

    fn call(&self, name: &str, args: Vec<Argument>) -> std::result::Result<Argument, CommandError> {
        let cmd = self
            .registry
            .find(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
        cmd.execute(args, &self.registry)
    }
}
