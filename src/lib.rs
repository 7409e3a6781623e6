//! Kairos Interactive Installer - terminal wizard for installing Kairos
//!
//! This library provides:
//! - Disk discovery from sysfs
//! - A page-based terminal wizard with back navigation
//! - Customization prompts contributed by provider plugins
//! - Generation of the YAML install configuration
//! - Installer subprocess supervision with step tracking and abort

// Initialize i18n with locale files
rust_i18n::i18n!("locales", fallback = "en");

pub mod cli;
pub mod config;
pub mod disks;
pub mod error;
pub mod i18n;
pub mod install_config;
pub mod installer;
pub mod os;
pub mod plugin;
pub mod session;
pub mod tui;

pub use cli::Cli;
pub use config::{ConfigError, InstallerSettings, Settings};
pub use disks::Disk;
pub use error::{Error, Result};
pub use i18n::init_locale;
pub use installer::{InstallMonitor, InstallRequest, InstallState};
pub use plugin::{PromptSource, ProviderPrompts};
pub use session::Session;
pub use tui::{ExitReason, TuiApp, Wizard};
