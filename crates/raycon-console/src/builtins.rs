//! Stateless built-in commands: `Help`, `Print`, `Dump`.

use raycon_types::error::CommandError;

use crate::argument::Argument;
use crate::command::Command;
use crate::interpreter::CommandManager;
use crate::parser::parse_function_and_argument_list;
use crate::registry::CommandRegistry;

/// Register every built-in on `manager`.
pub fn register_builtins(manager: &mut CommandManager) {
    manager.add_command(Box::new(Help));
    manager.add_command(Box::new(Print));
    manager.add_command(Box::new(Dump));
}

/// `Help` lists commands; `Help(name)` describes one.
///
/// The argument is taken as raw text, so `Help(SetSpeed(2))` describes
/// `SetSpeed` without running it.
pub struct Help;

impl Help {
    fn describe(cmd: &dyn Command) -> String {
        if cmd.description().is_empty() {
            cmd.usage()
        } else {
            format!("{}\n  {}", cmd.usage(), cmd.description())
        }
    }
}

impl Command for Help {
    fn name(&self) -> &str {
        "Help"
    }

    fn description(&self) -> &str {
        "List commands, or describe one"
    }

    fn usage(&self) -> String {
        "Help(name)".to_string()
    }

    fn force_string_arguments(&self) -> bool {
        true
    }

    fn execute(
        &self,
        args: Vec<Argument>,
        registry: &CommandRegistry,
    ) -> Result<Argument, CommandError> {
        let Some(topic) = args.first() else {
            let width = registry.iter().map(|c| c.name().len()).max().unwrap_or(0);
            let lines: Vec<String> = registry
                .iter()
                .map(|c| {
                    format!("{:<width$}  {}", c.name(), c.description())
                        .trim_end()
                        .to_string()
                })
                .collect();
            return Ok(Argument::string(lines.join("\n")));
        };

        let text = topic.to_argument_text();
        let name = parse_function_and_argument_list(&text)
            .map(|(name, _)| name)
            .unwrap_or(text);
        if let Some(cmd) = registry.find(&name) {
            return Ok(Argument::string(Self::describe(cmd)));
        }
        let similar: Vec<&str> = registry.matches(&name).iter().map(|c| c.name()).collect();
        if similar.is_empty() {
            return Err(CommandError::UnknownCommand(name));
        }
        Err(CommandError::Failed(format!(
            "no such command: {name} (did you mean {}?)",
            similar.join(", ")
        )))
    }
}

/// `Print(a, b, ...)` shows its evaluated arguments separated by spaces.
pub struct Print;

impl Command for Print {
    fn name(&self) -> &str {
        "Print"
    }

    fn description(&self) -> &str {
        "Evaluate and show the arguments"
    }

    fn usage(&self) -> String {
        "Print(value, ...)".to_string()
    }

    fn execute(&self, args: Vec<Argument>, _: &CommandRegistry) -> Result<Argument, CommandError> {
        if args.is_empty() {
            return Ok(Argument::none());
        }
        let text: Vec<String> = args.iter().map(Argument::to_argument_text).collect();
        Ok(Argument::string(text.join(" ")))
    }
}

/// `Dump` shows every variable as `name = value`; `Dump(prefix)` only
/// those whose name starts with `prefix`.
pub struct Dump;

impl Command for Dump {
    fn name(&self) -> &str {
        "Dump"
    }

    fn description(&self) -> &str {
        "Show variable values"
    }

    fn usage(&self) -> String {
        "Dump(prefix)".to_string()
    }

    fn force_string_arguments(&self) -> bool {
        true
    }

    fn execute(
        &self,
        args: Vec<Argument>,
        registry: &CommandRegistry,
    ) -> Result<Argument, CommandError> {
        let prefix = args.first().map(Argument::to_argument_text).unwrap_or_default();
        let lines: Vec<String> = registry
            .variables()
            .filter(|cmd| cmd.name().starts_with(&prefix))
            .filter_map(|cmd| Some(format!("{} = {}", cmd.name(), cmd.value()?)))
            .collect();
        if lines.is_empty() {
            return Ok(Argument::none());
        }
        Ok(Argument::string(lines.join("\n")))
    }
}
