//! Installation state machine driven by installer notifications

use super::steps::{self, COMPLETE_STEP};
use super::{InstallRequest, InstallerEvent};
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::process::{Child, ExitStatus};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Upper bound of notifications drained by one [`InstallMonitor::poll`]
pub const MAX_EVENTS_PER_POLL: usize = 64;

/// How long output is still collected after the installer exited while
/// something else keeps the pipe open
pub const OUTPUT_GRACE: Duration = Duration::from_millis(500);

/// Output lines kept for display
const RECENT_LINES: usize = 8;

/// Lifecycle of one installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    NotStarted,
    Running,
    Completed,
    Failed(String),
    /// Killed on operator request
    Aborted,
}

/// Outcome of a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// Check again after the interval
    Again(Duration),
    /// Installation reached a terminal state, stop polling
    Done,
}

/// Tracks progress of the installer subprocess
#[derive(Debug)]
pub struct InstallMonitor {
    state: InstallState,
    abort_requested: bool,
    cursor: usize,
    status: String,
    recent: VecDeque<String>,
    events: Option<Receiver<InstallerEvent>>,
    output_closed: bool,
    child: Option<Child>,
    exited_at: Option<Instant>,
    reader: Option<JoinHandle<()>>,
    interval: Duration,
}

impl InstallMonitor {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: InstallState::NotStarted,
            abort_requested: false,
            cursor: 0,
            status: steps::label(0).to_string(),
            recent: VecDeque::with_capacity(RECENT_LINES),
            events: None,
            output_closed: false,
            child: None,
            exited_at: None,
            reader: None,
            interval,
        }
    }

    /// Spawn the installer. A spawn failure leaves the monitor `Failed`.
    pub fn start(&mut self, request: &InstallRequest) -> Result<()> {
        if self.state != InstallState::NotStarted {
            return Err(Error::AlreadyStarted);
        }
        match super::spawn(request) {
            Ok(run) => {
                self.child = Some(run.child);
                self.reader = Some(run.reader);
                self.attach(run.events);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Installer could not be started");
                self.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Follow an existing notification channel.
    ///
    /// Without a child process the installation completes when the channel
    /// closes.
    pub fn attach(&mut self, events: Receiver<InstallerEvent>) {
        self.events = Some(events);
        self.output_closed = false;
        self.state = InstallState::Running;
    }

    /// Drain pending notifications and check the child without blocking.
    ///
    /// Once the installer has exited, the outcome follows from its exit
    /// status. Output still queued is drained first; the pipe closing is
    /// not required.
    pub fn poll(&mut self) -> Poll {
        if self.state != InstallState::Running {
            return Poll::Done;
        }
        if self.abort_requested {
            return Poll::Again(self.interval);
        }

        self.drain(MAX_EVENTS_PER_POLL);

        let exit = match self.child.as_mut().map(Child::try_wait) {
            None if self.output_closed => {
                self.complete();
                return Poll::Done;
            }
            None | Some(Ok(None)) => return Poll::Again(self.interval),
            Some(Ok(Some(status))) => status,
            Some(Err(e)) => {
                error!(error = %e, "Checking installer status failed");
                self.fail(e.to_string());
                return Poll::Done;
            }
        };

        let exited_at = *self.exited_at.get_or_insert_with(|| {
            debug!(%exit, "Installer exited");
            Instant::now()
        });
        // Lines written just before the exit may still be in the pipe
        if !self.output_closed && exited_at.elapsed() < OUTPUT_GRACE {
            return Poll::Again(self.interval);
        }

        self.drain(MAX_EVENTS_PER_POLL * 16);
        self.finish(exit);
        Poll::Done
    }

    /// Show the abort confirmation. Only honored while running.
    pub fn request_abort(&mut self) -> bool {
        if self.state == InstallState::Running && !self.abort_requested {
            warn!(step = %self.status, "Abort requested");
            self.abort_requested = true;
            return true;
        }
        false
    }

    /// Dismiss the confirmation and keep installing
    pub fn cancel_abort(&mut self) {
        if self.abort_requested {
            info!("Abort cancelled, installation continues");
        }
        self.abort_requested = false;
    }

    /// Kill and reap the installer. Never fails; kill errors are logged.
    ///
    /// The child stays unreaped until here, so its process id cannot have
    /// been reused.
    pub fn confirm_abort(&mut self) {
        if let Some(mut child) = self.child.take() {
            let pid = child.id();
            match child.kill() {
                Ok(()) => match child.wait() {
                    Ok(status) => warn!(pid, %status, "Installer killed on operator request"),
                    Err(e) => error!(pid, error = %e, "Waiting for killed installer failed"),
                },
                Err(e) => error!(pid, error = %e, "Failed to kill installer"),
            }
        }
        // The reader ends by itself once the pipe closes
        self.reader = None;
        self.events = None;
        self.abort_requested = false;
        self.state = InstallState::Aborted;
        self.status = "Installation aborted".to_string();
    }

    pub fn state(&self) -> &InstallState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == InstallState::Running
    }

    /// Completed, failed or aborted
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            InstallState::Completed | InstallState::Failed(_) | InstallState::Aborted
        )
    }

    pub fn abort_requested(&self) -> bool {
        self.abort_requested
    }

    /// Current step index
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Current step label, or the error text after a failure
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn percent(&self) -> u16 {
        steps::percent(self.cursor)
    }

    /// Most recent output lines, oldest first
    pub fn recent_output(&self) -> impl Iterator<Item = &str> {
        self.recent.iter().map(String::as_str)
    }

    fn push_line(&mut self, line: String) {
        if self.recent.len() == RECENT_LINES {
            self.recent.pop_front();
        }
        self.recent.push_back(line);
    }

    fn advance(&mut self, index: usize) {
        let index = index.min(COMPLETE_STEP);
        if index > self.cursor {
            self.cursor = index;
            self.status = steps::label(index).to_string();
            info!(step = index, label = %self.status, "Installation step");
        }
    }

    fn drain(&mut self, limit: usize) {
        let Some(events) = self.events.as_ref() else {
            return;
        };
        let mut drained = Vec::new();
        while drained.len() < limit {
            match events.try_recv() {
                Ok(event) => drained.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.output_closed = true;
                    break;
                }
            }
        }

        for event in drained {
            match event {
                InstallerEvent::Output(line) => self.push_line(line),
                InstallerEvent::Step(index) => self.advance(index),
            }
        }
    }

    fn finish(&mut self, exit: ExitStatus) {
        if exit.success() {
            self.complete();
        } else {
            error!(%exit, "Installer failed");
            self.fail(format!("installer exited with {}", exit));
        }
    }

    fn fail(&mut self, message: String) {
        self.status = format!("Error: {}", message);
        self.state = InstallState::Failed(message);
        self.release();
    }

    fn complete(&mut self) {
        self.cursor = COMPLETE_STEP;
        self.status = steps::label(COMPLETE_STEP).to_string();
        self.state = InstallState::Completed;
        info!("Installation complete");
        self.release();
    }

    fn release(&mut self) {
        self.events = None;
        self.child = None;
        let Some(reader) = self.reader.take() else {
            return;
        };
        if !self.output_closed {
            // Held open by a leftover background process
            debug!("Installer output still open, reader left running");
            return;
        }
        if reader.join().is_err() {
            warn!("Installer output reader panicked");
        }
    }
}
