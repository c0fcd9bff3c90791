//! Console configuration loaded from TOML.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConsoleError, Result};

/// Tunables for the console engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConsoleConfig {
    /// Maximum number of statements kept in history.
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    /// Maximum number of lines kept in the output log.
    #[serde(default = "default_max_output_lines")]
    pub max_output_lines: usize,
    /// Maximum number of autocomplete suggestions offered at once.
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    /// Script replayed at startup and rewritten with watched values.
    #[serde(default = "default_autoexec_path")]
    pub autoexec_path: PathBuf,
    /// Rewrite the autoexec script when the console shuts down.
    #[serde(default = "yes")]
    pub write_autoexec_on_exit: bool,
}

fn default_history_size() -> usize {
    10
}

fn default_max_output_lines() -> usize {
    200
}

fn default_max_suggestions() -> usize {
    8
}

fn default_autoexec_path() -> PathBuf {
    PathBuf::from("autoexec.cfg")
}

fn yes() -> bool {
    true
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            max_output_lines: default_max_output_lines(),
            max_suggestions: default_max_suggestions(),
            autoexec_path: default_autoexec_path(),
            write_autoexec_on_exit: yes(),
        }
    }
}

impl ConsoleConfig {
    /// Parse a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        if config.history_size == 0 {
            return Err(ConsoleError::Config(
                "history_size must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// Load a configuration file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!(
                "No console config at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| ConsoleError::Config(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ConsoleConfig::from_toml_str("").unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.history_size, 10);
        assert_eq!(config.autoexec_path, PathBuf::from("autoexec.cfg"));
        assert!(config.write_autoexec_on_exit);
    }

    #[test]
    fn partial_toml_overrides_some_fields() {
        let config = ConsoleConfig::from_toml_str(
            r#"
history_size = 32
autoexec_path = "cfg/boot.cfg"
write_autoexec_on_exit = false
"#,
        )
        .unwrap();
        assert_eq!(config.history_size, 32);
        assert_eq!(config.autoexec_path, PathBuf::from("cfg/boot.cfg"));
        assert!(!config.write_autoexec_on_exit);
        assert_eq!(config.max_output_lines, 200);
        assert_eq!(config.max_suggestions, 8);
    }

    #[test]
    fn zero_history_is_rejected() {
        let err = ConsoleConfig::from_toml_str("history_size = 0").unwrap_err();
        assert!(format!("{err}").contains("history_size"));
    }

    #[test]
    fn wrong_type_is_a_toml_error() {
        let err = ConsoleConfig::from_toml_str("history_size = \"many\"").unwrap_err();
        assert!(matches!(err, ConsoleError::TomlParse(_)));
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConsoleConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.toml");
        std::fs::write(&path, "max_suggestions = 3\n").unwrap();
        let config = ConsoleConfig::load(&path).unwrap();
        assert_eq!(config.max_suggestions, 3);
    }

    #[test]
    fn load_invalid_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.toml");
        std::fs::write(&path, "history_size = [").unwrap();
        let err = ConsoleConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConsoleError::Config(ref msg) if msg.contains("console.toml")));
    }
}
