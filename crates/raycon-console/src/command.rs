//! The `Command` trait and the variable/function-backed command variants.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use raycon_types::error::CommandError;

use crate::argument::{Argument, ArgumentKind};
use crate::convert::ConsoleValue;
use crate::registry::CommandRegistry;

/// A single named, executable console command.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `Help`.
    fn description(&self) -> &str {
        ""
    }

    /// Usage string shown by `Help <name>`.
    fn usage(&self) -> String {
        self.name().to_string()
    }

    /// When true, arguments reach `execute` as unevaluated String literals.
    fn force_string_arguments(&self) -> bool {
        false
    }

    /// Variable-backed commands are read by a bare name and can be watched
    /// by value.
    fn is_variable(&self) -> bool {
        false
    }

    /// Current value of a variable-backed command.
    fn value(&self) -> Option<Argument> {
        None
    }

    /// Execute the command with already-evaluated arguments.
    fn execute(
        &self,
        args: Vec<Argument>,
        registry: &CommandRegistry,
    ) -> Result<Argument, CommandError>;
}

// ---------------------------------------------------------------------------
// Variable slots
// ---------------------------------------------------------------------------

/// A shared handle to a native variable exposed to the console.
///
/// The host keeps one clone and reads it every frame; the console keeps
/// another inside a [`GetSet`] command.
#[derive(Debug, Default)]
pub struct VariableSlot<T>(Rc<RefCell<T>>);

impl<T> VariableSlot<T> {
    /// Create a slot holding `value`.
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Replace the stored value.
    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    /// Borrow the stored value.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }
}

impl<T: Clone> VariableSlot<T> {
    /// Copy of the stored value.
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

impl<T> Clone for VariableSlot<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

/// Shared set path for variable commands.
///
/// The result is the value read back after the set, with `"<name> = "` in
/// front. Its kind is the single argument's kind, or Unknown when several
/// arguments were combined into a vector.
fn assign<T: ConsoleValue>(
    name: &str,
    args: Vec<Argument>,
    set: impl FnOnce(T),
    get: impl FnOnce() -> T,
) -> Result<Argument, CommandError> {
    let (kind, value) = match <[Argument; 1]>::try_from(args) {
        Ok([single]) => (single.kind(), single),
        Err(args) => (ArgumentKind::Unknown, Argument::concat(&args, name)),
    };
    set(T::from_argument(&value)?);
    let mut result = get().to_argument(name).with_kind(kind);
    result.prefix_front(&format!("{name} = "));
    Ok(result)
}

// ---------------------------------------------------------------------------
// GetSet
// ---------------------------------------------------------------------------

/// A command bound directly to a [`VariableSlot`].
pub struct GetSet<T> {
    name: String,
    description: String,
    slot: VariableSlot<T>,
}

impl<T: ConsoleValue + Clone> GetSet<T> {
    /// Bind the variable `name` to `slot`.
    pub fn new(name: impl Into<String>, slot: VariableSlot<T>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            slot,
        }
    }

    /// Set the text shown by `Help`.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl<T: ConsoleValue + Clone> Command for GetSet<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn usage(&self) -> String {
        variable_usage(&self.name, &self.slot.get().to_argument(&self.name))
    }

    fn is_variable(&self) -> bool {
        true
    }

    fn value(&self) -> Option<Argument> {
        Some(self.slot.get().to_argument(&self.name))
    }

    fn execute(&self, args: Vec<Argument>, _: &CommandRegistry) -> Result<Argument, CommandError> {
        if args.is_empty() {
            return Ok(self.slot.get().to_argument(&self.name));
        }
        assign(&self.name, args, |v| self.slot.set(v), || self.slot.get())
    }
}

fn variable_usage(name: &str, current: &Argument) -> String {
    let kinds = vec![current.kind().name(); current.len().max(1)];
    format!("{name}({})", kinds.join(", "))
}

// ---------------------------------------------------------------------------
// GetterSetter
// ---------------------------------------------------------------------------

type Getter<T> = Box<dyn Fn() -> T>;
type Setter<T> = Box<dyn Fn(T)>;

/// A variable command backed by closures, for values that live behind an
/// accessor (a camera field, a renderer setting).
pub struct GetterSetter<T> {
    name: String,
    description: String,
    getter: Getter<T>,
    setter: Option<Setter<T>>,
}

impl<T: ConsoleValue> GetterSetter<T> {
    /// Create a variable backed by a getter and a setter.
    pub fn new(
        name: impl Into<String>,
        getter: impl Fn() -> T + 'static,
        setter: impl Fn(T) + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            getter: Box::new(getter),
            setter: Some(Box::new(setter)),
        }
    }

    /// A variable that can be read and watched but never assigned.
    pub fn read_only(name: impl Into<String>, getter: impl Fn() -> T + 'static) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            getter: Box::new(getter),
            setter: None,
        }
    }

    /// Set the text shown by `Help`.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl<T: ConsoleValue> Command for GetterSetter<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn usage(&self) -> String {
        variable_usage(&self.name, &(self.getter)().to_argument(&self.name))
    }

    fn is_variable(&self) -> bool {
        true
    }

    fn value(&self) -> Option<Argument> {
        Some((self.getter)().to_argument(&self.name))
    }

    fn execute(&self, args: Vec<Argument>, _: &CommandRegistry) -> Result<Argument, CommandError> {
        if args.is_empty() {
            return Ok((self.getter)().to_argument(&self.name));
        }
        let Some(setter) = &self.setter else {
            return Err(CommandError::ReadOnly(self.name.clone()));
        };
        assign(&self.name, args, setter, &self.getter)
    }
}

// ---------------------------------------------------------------------------
// CallMethod
// ---------------------------------------------------------------------------

type Method = Box<dyn Fn(&[Argument]) -> Result<Argument, CommandError>>;

/// A command that calls a native function with the evaluated arguments.
pub struct CallMethod {
    name: String,
    description: String,
    usage: Option<String>,
    arity: Option<usize>,
    raw_arguments: bool,
    method: Method,
}

impl CallMethod {
    /// Create a function command backed by `f`.
    pub fn new(
        name: impl Into<String>,
        method: impl Fn(&[Argument]) -> Result<Argument, CommandError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            usage: None,
            arity: None,
            raw_arguments: false,
            method: Box::new(method),
        }
    }

    /// Reject calls that do not pass exactly `arity` arguments.
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Receive the argument text unevaluated, one String per top-level
    /// comma-separated piece.
    pub fn with_raw_arguments(mut self) -> Self {
        self.raw_arguments = true;
        self
    }

    /// Set the text shown by `Help`.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Override the generated usage line.
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }
}

impl Command for CallMethod {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn usage(&self) -> String {
        match (&self.usage, self.arity) {
            (Some(usage), _) => usage.clone(),
            (None, Some(n)) => format!("{}({})", self.name, vec!["_"; n].join(", ")),
            (None, None) => format!("{}(...)", self.name),
        }
    }

    fn force_string_arguments(&self) -> bool {
        self.raw_arguments
    }

    fn execute(&self, args: Vec<Argument>, _: &CommandRegistry) -> Result<Argument, CommandError> {
        if let Some(expected) = self.arity
            && args.len() != expected
        {
            return Err(CommandError::ArgumentCount {
                name: self.name.clone(),
                expected,
                found: args.len(),
            });
        }
        (self.method)(&args)
    }
}
