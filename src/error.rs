//! Error types for the interactive installer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for installer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the interactive installer
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to start installer {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("Installer is already running")]
    AlreadyStarted,

    #[error("Plugin {} failed: {message}", plugin.display())]
    Plugin { plugin: PathBuf, message: String },

    #[error("Invalid prompt descriptor: {0}")]
    InvalidPrompt(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
