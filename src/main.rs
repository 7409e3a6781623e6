//! Kairos Interactive Installer
//!
//! Takes over the terminal, collects the installation choices and runs
//! the installer. Logs go to a file only, since the terminal belongs to
//! the UI.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use interactive_installer::tui::pages;
use interactive_installer::{Cli, ExitReason, ProviderPrompts, Session, Settings, TuiApp, Wizard, disks, init_locale, os};
use std::path::Path;
use tracing::{Level, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<()> {
    // Initialize locale based on system settings
    init_locale();

    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", Settings::sample()?);
        return Ok(());
    }

    let settings = Settings::load_or_default(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;
    let settings = cli.merge_with_settings(settings);

    // Setup file-only logging before the TUI starts
    let (guard, log_path) = match setup_file_only_logging(&cli, &settings.log_file) {
        Ok(guard) => (guard, Some(settings.log_file.clone())),
        Err(e) => {
            // Without a log file, events go nowhere rather than onto the UI
            eprintln!("Cannot open log file {}: {}", settings.log_file.display(), e);
            (setup_sink_logging(), None)
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        started = %Local::now().format("%Y-%m-%d %H:%M:%S"),
        settings = %cli.config.display(),
        installer = %settings.installer.program.display(),
        "Interactive installer starting"
    );

    let reason = match run(&settings, log_path) {
        Ok(reason) => reason,
        Err(e) => {
            error!(error = %e, "Interactive installer failed");
            return Err(e);
        }
    };
    info!(?reason, "Interactive installer finished");

    // Flush the log before a non-zero exit skips destructors
    drop(guard);
    match reason {
        ExitReason::Failed => std::process::exit(1),
        ExitReason::Aborted => std::process::exit(130),
        ExitReason::Quit | ExitReason::Finished => Ok(()),
    }
}

/// Probe disks, build the pages and run the wizard
fn run(settings: &Settings, log_path: Option<std::path::PathBuf>) -> Result<ExitReason> {
    if !os::has_admin_privileges() {
        warn!("Not running as root; disk access and installation may fail");
    }

    let disks = match disks::probe(&settings.sys_block) {
        Ok(disks) => disks,
        Err(e) => {
            warn!(error = %e, dir = %settings.sys_block.display(), "Disk probe failed");
            Vec::new()
        }
    };
    info!(count = disks.len(), "Disks found");

    let source = Box::new(ProviderPrompts::new(settings.provider_dirs.clone()));
    let session = match log_path {
        Some(path) => Session::with_log_path(path),
        None => Session::new(),
    };

    let wizard = Wizard::new(pages::build(disks, source, settings), session, settings.title());
    let app = TuiApp::new(wizard).context("initializing terminal")?;
    let reason = app.run().context("running the wizard")?;
    Ok(reason)
}

/// Setup file-only logging for the TUI session. The log file is appended to.
fn setup_file_only_logging(cli: &Cli, log_path: &Path) -> Result<WorkerGuard> {
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if cli.json_log {
        subscriber
            .with(fmt::layer().json().with_writer(non_blocking))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .init();
    }

    Ok(guard)
}

/// Discard all events
fn setup_sink_logging() -> WorkerGuard {
    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::sink());
    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();
    guard
}
