//! Error types for the raycon console.

use std::io;

/// Errors produced by the raycon console framework.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("config error: {0}")]
    Config(String),

    #[error("autoexec error: {0}")]
    Autoexec(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Structurally invalid statement text.
///
/// Positions are byte offsets into the statement that was parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("expected a command name at {position}")]
    MissingName { position: usize },

    #[error("unterminated parenthesis opened at {position}")]
    UnterminatedParens { position: usize },

    #[error("unexpected ')' at {position}")]
    UnexpectedCloseParen { position: usize },

    #[error("unexpected '{token}' at {position}")]
    UnexpectedToken { token: String, position: usize },

    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: usize },

    #[error("unexpected end of input")]
    UnexpectedEnd,
}

/// A statement that parsed but could not be carried out.
///
/// These are reported to the user as text, never propagated as failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("no such command: {0}")]
    UnknownCommand(String),

    #[error("{name} expects {expected} argument(s), got {found}")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("cannot convert {found} to {expected}")]
    Conversion { expected: String, found: String },

    #[error("{0} is read-only")]
    ReadOnly(String),

    #[error("{0}")]
    Failed(String),
}
