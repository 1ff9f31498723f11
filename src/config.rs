//! Configuration file support
//!
//! snip reads optional defaults from ~/.snip/config.toml. The file can turn
//! regex switches on by default (command-line flags can only add to these,
//! never unset them) and change the separator used to join split fields.
//! A missing file is not an error; a malformed one is.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnipError};
use crate::pattern::RegexFlags;

/// Defaults loaded once at startup, before arguments are interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Regex switches enabled by default
    #[serde(default)]
    pub regex: RegexDefaults,

    /// Output formatting
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegexDefaults {
    /// Always match case-insensitively (as if -i were given)
    #[serde(default)]
    pub insensitive: bool,

    /// Always scan whole buffers (as if -m were given)
    #[serde(default)]
    pub multiline: bool,

    /// Always let `.` match `\n` (as if -s were given)
    #[serde(default)]
    pub dotall: bool,

    /// Always swap quantifier greediness (as if -U were given)
    #[serde(default)]
    pub ungreedy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Separator between selected split fields
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
        }
    }
}

fn default_separator() -> String {
    ",".to_string()
}

impl Config {
    /// Load the user configuration, falling back to defaults when no file
    /// exists (or when no home directory can be determined).
    pub fn load() -> Result<Config> {
        match config_path() {
            Some(path) if path.exists() => Config::load_from(&path),
            _ => Ok(Config::default()),
        }
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)
            .map_err(|e| SnipError::io(Some(path.display().to_string()), e))?;
        toml::from_str(&content).map_err(|e| {
            SnipError::Config(format!("invalid config file {}: {}", path.display(), e))
        })
    }

    /// Fold the configured defaults into the flags given on the command
    /// line. Flags are additive: the file can enable a switch, arguments
    /// cannot disable it again.
    pub fn apply_defaults(&self, flags: RegexFlags) -> RegexFlags {
        RegexFlags {
            case_insensitive: flags.case_insensitive || self.regex.insensitive,
            multiline: flags.multiline || self.regex.multiline,
            dot_matches_newline: flags.dot_matches_newline || self.regex.dotall,
            ungreedy: flags.ungreedy || self.regex.ungreedy,
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".snip").join("config.toml"))
}
