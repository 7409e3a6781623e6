//! Installer subprocess supervision
//!
//! The installer runs as a child process whose stdout and stderr share one
//! pipe. A reader thread owns the read end only; it logs every line,
//! classifies it into a step and forwards [`InstallerEvent`]s over an mpsc
//! channel. The [`InstallMonitor`] owns the child and learns about its exit
//! with `try_wait`, so a background process still holding the pipe open
//! cannot delay completion. The UI side never blocks (see
//! [`InstallMonitor::poll`]).

pub mod monitor;
pub mod steps;

pub use monitor::{InstallMonitor, InstallState, Poll};
pub use steps::{COMPLETE_STEP, STEPS};

use crate::config::InstallerSettings;
use crate::error::{Error, Result};
use crate::session::Session;
use std::io::{BufRead, BufReader, PipeReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Notification sent from the reader thread to the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallerEvent {
    /// Raw output line
    Output(String),
    /// Step announced by the last output line
    Step(usize),
}

/// Program and arguments for one installer run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl InstallRequest {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Expand the argument template from `settings` with session values.
    ///
    /// `{device}`, `{username}`, `{password}` and `{config}` are replaced;
    /// `{config}` is empty when no document was written.
    pub fn from_template(settings: &InstallerSettings, session: &Session, config: Option<&Path>) -> Self {
        let config = config.map(|p| p.display().to_string()).unwrap_or_default();
        let args = settings
            .args
            .iter()
            .map(|arg| {
                arg.replace("{device}", session.device())
                    .replace("{username}", session.username())
                    .replace("{password}", session.password())
                    .replace("{config}", &config)
            })
            .collect();
        Self::new(settings.program.clone(), args)
    }
}

/// Handles of a running installer
#[derive(Debug)]
pub struct InstallerRun {
    pub child: Child,
    pub events: Receiver<InstallerEvent>,
    pub reader: JoinHandle<()>,
}

/// Start the installer and its output reader
pub fn spawn(request: &InstallRequest) -> Result<InstallerRun> {
    let (output, writer) = std::io::pipe()?;

    let mut command = Command::new(&request.program);
    command
        .args(&request.args)
        .stdin(Stdio::null())
        .stdout(writer.try_clone()?)
        .stderr(writer);
    let mut child = command.spawn().map_err(|source| Error::Spawn {
        program: request.program.clone(),
        source,
    })?;
    // The command holds write ends of the pipe; the reader only sees EOF
    // once every copy is closed.
    drop(command);

    info!(program = %request.program.display(), pid = child.id(), "Installer started");

    let (sender, events) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("installer-output".to_string())
        .spawn(move || read_output(output, sender));

    match spawned {
        Ok(reader) => Ok(InstallerRun {
            child,
            events,
            reader,
        }),
        Err(e) => {
            error!(error = %e, "Cannot start installer output reader");
            match child.kill().and_then(|()| child.wait()) {
                Ok(status) => warn!(%status, "Orphaned installer stopped"),
                Err(kill_err) => warn!(pid = child.id(), error = %kill_err, "Failed to stop orphaned installer"),
            }
            Err(Error::Io(e))
        }
    }
}

/// Reader thread body: forward every line until the pipe closes
fn read_output(output: PipeReader, sender: Sender<InstallerEvent>) {
    let reader = BufReader::new(output);
    for chunk in reader.split(b'\n') {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Installer output read failed");
                break;
            }
        };
        let line = String::from_utf8_lossy(&bytes).trim_end_matches('\r').to_string();
        info!(target: "installer::output", "{}", line);

        let step = steps::classify(&line);
        // A dropped receiver means the monitor is done; keep draining so
        // writers never block on a full pipe.
        let _ = sender.send(InstallerEvent::Output(line));
        if let Some(step) = step {
            let _ = sender.send(InstallerEvent::Step(step));
        }
    }
    debug!("Installer output closed");
}
