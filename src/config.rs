//! Settings for the interactive installer
//!
//! Settings come from an optional TOML file and can be overridden from
//! the command line (see [`crate::cli::Cli`]).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the settings file
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/kairos/interactive-installer.toml";

/// Title shown when no branding file is present
pub const DEFAULT_TITLE: &str = "Kairos Interactive Installer";

/// Installer invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerSettings {
    /// Installer executable
    pub program: PathBuf,
    /// Argument template. `{device}`, `{username}`, `{password}` and
    /// `{config}` are substituted from the session.
    pub args: Vec<String>,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("kairos-agent-installer"),
            args: vec![
                "{device}".into(),
                "{username}".into(),
                "{password}".into(),
            ],
        }
    }
}

/// Settings for the interactive installer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the generated install configuration is written
    pub output: Option<PathBuf>,

    /// Persistent log file
    pub log_file: PathBuf,

    /// Directories searched for `agent-provider*` plugins
    pub provider_dirs: Vec<PathBuf>,

    /// File overriding the wizard title
    pub branding_file: PathBuf,

    /// Directory listing block devices
    pub sys_block: PathBuf,

    /// Interval between installer output checks (milliseconds)
    pub poll_interval_ms: u64,

    /// Installer subprocess
    pub installer: InstallerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output: Some(PathBuf::from("/tmp/kairos-install-config.yaml")),
            log_file: PathBuf::from("/tmp/kairos-installer.log"),
            provider_dirs: vec![
                PathBuf::from("/system/providers"),
                PathBuf::from("/usr/local/system/providers"),
            ],
            branding_file: PathBuf::from("/etc/kairos/branding/interactive_install_text"),
            sys_block: PathBuf::from("/sys/block"),
            poll_interval_ms: 100,
            installer: InstallerSettings::default(),
        }
    }
}

impl Settings {
    /// Interval between installer output checks
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Wizard title, taken from the branding file when present
    pub fn title(&self) -> String {
        match fs::read_to_string(&self.branding_file) {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => DEFAULT_TITLE.to_string(),
        }
    }

    /// Load settings from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(settings)
    }

    /// Load settings from `path`, or defaults when the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Generate a sample settings file
    pub fn sample() -> Result<String, ConfigError> {
        toml::to_string_pretty(&Self::default())
            .map_err(|e| ConfigError::SerializeError { source: e })
    }
}

/// Errors that can occur when loading settings
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read settings file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse settings file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to serialize settings
    SerializeError { source: toml::ser::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read settings file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse settings file '{}': {}", path.display(), source)
            }
            ConfigError::SerializeError { source } => {
                write!(f, "Failed to serialize settings: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::SerializeError { source } => Some(source),
        }
    }
}
