//! CLI argument parsing with clap

use crate::config::{DEFAULT_SETTINGS_PATH, Settings};
use clap::Parser;
use std::path::PathBuf;

/// Kairos interactive installer
///
/// Walks the operator through disk selection and system customization in
/// the terminal, then runs the installer and follows its progress.
#[derive(Parser, Debug)]
#[command(name = "interactive-installer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the settings file (TOML format)
    ///
    /// A missing file is not an error; built-in defaults are used.
    #[arg(short = 'C', long, default_value = DEFAULT_SETTINGS_PATH)]
    pub config: PathBuf,

    /// Installer executable to run once the wizard is complete
    #[arg(short, long)]
    pub installer: Option<PathBuf>,

    /// Where the generated install configuration is written
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Log file path
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// Print the default settings as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,
}

impl Cli {
    /// Merge CLI arguments with settings from file.
    /// CLI arguments take precedence over file settings.
    pub fn merge_with_settings(&self, mut settings: Settings) -> Settings {
        if let Some(ref installer) = self.installer {
            settings.installer.program = installer.clone();
        }
        if let Some(ref output) = self.output {
            settings.output = Some(output.clone());
        }
        if let Some(ref log_file) = self.log_file {
            settings.log_file = log_file.clone();
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["interactive-installer"]);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_SETTINGS_PATH));
        assert!(!cli.verbose);
        assert!(!cli.json_log);

        let settings = cli.merge_with_settings(Settings::default());
        assert_eq!(settings.installer.program, Settings::default().installer.program);
        assert_eq!(settings.log_file, PathBuf::from("/tmp/kairos-installer.log"));
    }

    #[test]
    fn test_cli_overrides_settings() {
        let cli = Cli::parse_from([
            "interactive-installer",
            "--installer",
            "/opt/bin/install",
            "-o",
            "/run/install.yaml",
            "--log-file",
            "/var/log/installer.log",
            "--json-log",
        ]);
        let settings = cli.merge_with_settings(Settings::default());
        assert_eq!(settings.installer.program, PathBuf::from("/opt/bin/install"));
        assert_eq!(settings.output, Some(PathBuf::from("/run/install.yaml")));
        assert_eq!(settings.log_file, PathBuf::from("/var/log/installer.log"));
        assert!(cli.json_log);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
