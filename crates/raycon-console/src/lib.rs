//! Console command engine for the raycon ray tracer.
//!
//! Text typed into the console (`SetSpeed(3.5)`, `rayBounces`,
//! `CameraPos 0, 1, -5`) is parsed into a statement, resolved against a
//! registry of named commands, and executed with dynamically typed
//! [`Argument`]s. Variables are bound to host state through shared
//! [`VariableSlot`]s or getter/setter closures. An autoexec script replays
//! statements at startup and keeps watched values written back to disk.

pub mod argument;
pub mod autoexec;
pub mod builtins;
pub mod command;
pub mod console;
pub mod convert;
pub mod dictionary;
pub mod history;
pub mod interpreter;
pub mod ops;
pub mod parser;
pub mod registry;

/// A dynamically typed, possibly multi-element console value.
pub use argument::{Argument, ArgumentKind};
/// Autoexec script replay and rewrite.
pub use autoexec::{AutoexecManager, AutoexecState, AutoexecStatus};
/// Register `Help`, `Print` and `Dump`.
pub use builtins::register_builtins;
/// The command trait and its variable/function-backed implementations.
pub use command::{CallMethod, Command, GetSet, GetterSetter, VariableSlot};
/// The console prompt driven by input events.
pub use console::Console;
/// Conversions between arguments and native values.
pub use convert::{ConsoleValue, FromArgument, ToArgument};
/// Bounded statement history.
pub use history::History;
/// Statement parsing and dispatch.
pub use interpreter::{CommandManager, Execution};
/// Split a statement into its name and raw argument text.
pub use parser::parse_function_and_argument_list;
/// Registry of available commands.
pub use registry::CommandRegistry;
