//! Autoexec script: replay at startup, rewrite watched values on save.
//!
//! The script is plain text, one statement per line. `//` lines and blank
//! lines are kept verbatim. A `watch ` prefix marks a name whose current
//! value is written back into the file by [`AutoexecManager::write_autoexec`].
//! The rewrite goes to `<path>.tmp` first and is renamed over the original,
//! so a failed write never truncates the script.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use raycon_types::error::{ConsoleError, Result};

use crate::argument::{Argument, ArgumentKind};
use crate::interpreter::{CommandManager, Execution};
use crate::parser::{leading_name, quote};
use crate::registry::WATCH_KEYWORD;

/// Load state of the autoexec script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoexecState {
    Unloaded,
    Loaded { found: bool },
}

/// Outcome of [`AutoexecManager::parse_autoexec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoexecStatus {
    Loaded { statements: usize },
    NotFound,
}

/// Tracks watched names and keeps the autoexec script in sync with them.
#[derive(Debug)]
pub struct AutoexecManager {
    variable_watches: BTreeMap<String, String>,
    function_watches: BTreeMap<String, String>,
    removed_watches: BTreeSet<String>,
    state: AutoexecState,
}

impl Default for AutoexecManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `watch <statement>` into `(true, statement)`.
pub(crate) fn strip_watch(line: &str) -> (bool, &str) {
    match line.strip_prefix(WATCH_KEYWORD) {
        Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest.trim_start()),
        _ => (false, line),
    }
}

/// Statement text of a value: elements joined with `", "`, String elements
/// quoted and escaped so they read back as one argument each.
fn value_text(value: &Argument) -> String {
    if value.kind() != ArgumentKind::String {
        return value.to_argument_text();
    }
    value
        .elements()
        .iter()
        .map(|e| quote(e))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `watch name(value)`, or `watch name value` when the line it replaces
/// used the space form.
fn watch_line(name: &str, value: &str, replaced: Option<&str>) -> String {
    let spaced = replaced.is_some_and(|stmt| !stmt[name.len()..].trim_start().starts_with('('));
    if spaced && !value.is_empty() {
        format!("{WATCH_KEYWORD} {name} {value}")
    } else {
        format!("{WATCH_KEYWORD} {name}({value})")
    }
}

fn split_line_ending(segment: &str) -> (&str, &str) {
    if let Some(line) = segment.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = segment.strip_suffix('\n') {
        (line, "\n")
    } else {
        (segment, "")
    }
}

/// A `<path>.tmp` file removed on drop unless it was renamed into place.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn for_target(target: &Path) -> Self {
        let mut name = target.as_os_str().to_owned();
        name.push(".tmp");
        Self {
            path: PathBuf::from(name),
            armed: true,
        }
    }

    fn persist(mut self, target: &Path) -> io::Result<()> {
        fs::rename(&self.path, target)?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

impl AutoexecManager {
    /// Create a manager with no watches and nothing loaded.
    pub fn new() -> Self {
        Self {
            variable_watches: BTreeMap::new(),
            function_watches: BTreeMap::new(),
            removed_watches: BTreeSet::new(),
            state: AutoexecState::Unloaded,
        }
    }

    /// Whether the script has been parsed, and whether it existed.
    pub fn state(&self) -> AutoexecState {
        self.state
    }

    /// True when `name` is watched.
    pub fn is_watched(&self, name: &str) -> bool {
        self.variable_watches.contains_key(name) || self.function_watches.contains_key(name)
    }

    /// Start watching `name`. Fails if no such command exists or the name is
    /// already watched.
    pub fn add_watch(&mut self, manager: &CommandManager, name: &str) -> bool {
        if self.is_watched(name) {
            log::warn!("Autoexec watch {name} already exists");
            return false;
        }
        let Some(cmd) = manager.get_command(name) else {
            log::warn!("Cannot watch {name}: no such command");
            return false;
        };
        if cmd.is_variable() {
            let current = cmd.value().map(|v| value_text(&v)).unwrap_or_default();
            self.variable_watches.insert(name.to_string(), current);
        } else {
            self.function_watches.insert(name.to_string(), String::new());
        }
        self.removed_watches.remove(name);
        true
    }

    /// Stop watching `name`. Its lines are dropped from the script on the
    /// next write.
    pub fn remove_watch(&mut self, name: &str) -> bool {
        let removed = self.variable_watches.remove(name).is_some()
            || self.function_watches.remove(name).is_some();
        if removed {
            self.removed_watches.insert(name.to_string());
        }
        removed
    }

    /// Every watch with the value it would be written with, sorted by name.
    /// Variables report their live value.
    pub fn watches(&self, manager: &CommandManager) -> Vec<(String, String)> {
        let variables = self.variable_watches.iter().map(|(name, last)| {
            let live = manager
                .get_variable(name)
                .and_then(|cmd| cmd.value())
                .map(|v| value_text(&v));
            (name.clone(), live.unwrap_or_else(|| last.clone()))
        });
        let functions = self
            .function_watches
            .iter()
            .map(|(name, args)| (name.clone(), args.clone()));
        let mut all: Vec<(String, String)> = variables.chain(functions).collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Remember the arguments of a successful call to a watched function.
    pub fn record_execution(&mut self, execution: &Execution) {
        if !execution.succeeded {
            return;
        }
        if let Some(args) = self.function_watches.get_mut(&execution.name) {
            args.clone_from(&execution.arguments);
        }
    }

    /// Replay the script at `path` through `manager`.
    ///
    /// A missing file is not an error. A line that fails to parse is logged
    /// with its line number and skipped.
    pub fn parse_autoexec(
        &mut self,
        path: &Path,
        manager: &CommandManager,
    ) -> Result<AutoexecStatus> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No autoexec at {}", path.display());
                self.state = AutoexecState::Loaded { found: false };
                return Ok(AutoexecStatus::NotFound);
            },
            Err(e) => {
                return Err(ConsoleError::Autoexec(format!("{}: {e}", path.display())));
            },
        };

        let mut statements = 0;
        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("//") {
                continue;
            }
            let (watched, statement) = strip_watch(trimmed);
            let execution = match manager.execute(statement) {
                Ok(execution) => execution,
                Err(e) => {
                    log::warn!("{}:{}: {e}", path.display(), index + 1);
                    continue;
                },
            };
            statements += 1;
            if !execution.succeeded {
                log::warn!("{}:{}: {}", path.display(), index + 1, execution.output);
            }
            if watched && !self.add_watch(manager, &execution.name) {
                log::warn!(
                    "{}:{}: watch on {} ignored",
                    path.display(),
                    index + 1,
                    execution.name
                );
            }
            self.record_execution(&execution);
        }

        self.state = AutoexecState::Loaded { found: true };
        log::info!("Loaded autoexec {} ({statements} statements)", path.display());
        Ok(AutoexecStatus::Loaded { statements })
    }

    /// Rewrite the script at `path` so watched names carry their current
    /// values. Returns false (after logging) if the file could not be
    /// written; the original is left untouched in that case.
    pub fn write_autoexec(&mut self, path: &Path, manager: &CommandManager) -> bool {
        let nothing_watched = self.variable_watches.is_empty() && self.function_watches.is_empty();
        if self.state == AutoexecState::Unloaded {
            if nothing_watched {
                log::warn!("Autoexec written before it was parsed; nothing to do");
                return true;
            }
            log::warn!("Autoexec written before it was parsed: {}", path.display());
        }
        if nothing_watched && self.removed_watches.is_empty() && !path.exists() {
            return true;
        }
        match self.rewrite(path, manager) {
            Ok(()) => {
                self.removed_watches.clear();
                self.state = AutoexecState::Loaded { found: true };
                log::info!("Wrote autoexec {}", path.display());
                true
            },
            Err(e) => {
                log::warn!("Failed to write autoexec {}: {e}", path.display());
                false
            },
        }
    }

    fn rewrite(&self, path: &Path, manager: &CommandManager) -> Result<()> {
        let original = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        let eol = if original.contains("\r\n") { "\r\n" } else { "\n" };
        let mut pending: BTreeMap<String, String> = self.watches(manager).into_iter().collect();

        let temp = TempFileGuard::for_target(path);
        let mut out = BufWriter::new(File::create(&temp.path)?);
        let mut open_line = false;

        for segment in original.split_inclusive('\n') {
            let (line, ending) = split_line_ending(segment);
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("//") {
                out.write_all(segment.as_bytes())?;
                open_line = ending.is_empty();
                continue;
            }
            let (_, statement) = strip_watch(trimmed);
            let name = leading_name(statement);
            if self.removed_watches.contains(name) {
                continue;
            }
            match pending.remove(name) {
                Some(value) => {
                    let rewritten = watch_line(name, &value, Some(statement));
                    write!(out, "{rewritten}{ending}")?;
                },
                None => out.write_all(segment.as_bytes())?,
            }
            open_line = ending.is_empty();
        }

        for (name, value) in &pending {
            if open_line {
                out.write_all(eol.as_bytes())?;
                open_line = false;
            }
            write!(out, "{}{eol}", watch_line(name, value, None))?;
        }

        let file = out.into_inner().map_err(io::IntoInnerError::into_error)?;
        file.sync_all()?;
        drop(file);
        temp.persist(path)?;
        Ok(())
    }
}
