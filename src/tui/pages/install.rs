//! Installation progress
//!
//! Activation freezes the session, writes the install configuration and
//! starts the installer. Progress arrives through recurring
//! [`Message::CheckInstaller`] timers.

use crate::config::InstallerSettings;
use crate::install_config;
use crate::installer::{InstallMonitor, InstallRequest, InstallState, Poll, STEPS};
use crate::session::Session;
use crate::tui::components::{progress_line, truncate_value};
use crate::tui::page::{Command, Message, Page};
use crate::tui::theme::theme;
use ratatui::text::{Line, Text};
use rust_i18n::t;
use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

pub const ID: &str = "install_process";

const OUTPUT_WIDTH: usize = 70;

pub struct InstallPage {
    monitor: InstallMonitor,
    settings: InstallerSettings,
    output: Option<PathBuf>,
}

impl InstallPage {
    pub fn new(settings: InstallerSettings, output: Option<PathBuf>, interval: Duration) -> Self {
        Self {
            monitor: InstallMonitor::new(interval),
            settings,
            output,
        }
    }

    fn check(&self, after: Duration) -> Command {
        Command::Schedule {
            message: Message::CheckInstaller,
            after,
        }
    }

    /// Write the configuration document, returning its path on success
    fn write_config(&self, session: &Session) -> Option<PathBuf> {
        let path = self.output.as_ref()?;
        match install_config::write_document(session, path) {
            Ok(()) => Some(path.clone()),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Cannot write install configuration");
                None
            }
        }
    }
}

impl Page for InstallPage {
    fn id(&self) -> &str {
        ID
    }

    fn title(&self) -> Cow<'static, str> {
        t!("install.title").to_string().into()
    }

    fn help(&self) -> Cow<'static, str> {
        match self.monitor.state() {
            InstallState::Running if self.monitor.abort_requested() => t!("help.abort").to_string().into(),
            InstallState::Running | InstallState::NotStarted => t!("help.installing").to_string().into(),
            _ => t!("help.finished").to_string().into(),
        }
    }

    fn init(&mut self, session: &mut Session) -> Vec<Command> {
        if self.monitor.state() != &InstallState::NotStarted {
            return Vec::new();
        }
        session.freeze();
        let config = self.write_config(session);
        let request = InstallRequest::from_template(&self.settings, session, config.as_deref());
        info!(
            program = %request.program.display(),
            device = %session.device(),
            user = %session.username(),
            "Starting installation"
        );
        match self.monitor.start(&request) {
            Ok(()) => vec![self.check(Duration::ZERO)],
            Err(_) => Vec::new(),
        }
    }

    fn handle(&mut self, _session: &mut Session, message: &Message) -> Vec<Command> {
        match message {
            Message::CheckInstaller => match self.monitor.poll() {
                Poll::Again(after) => vec![self.check(after)],
                Poll::Done => Vec::new(),
            },
            Message::Key(_) => Vec::new(),
        }
    }

    fn render(&self, session: &Session) -> Text<'static> {
        let monitor = &self.monitor;
        let mut lines = vec![
            progress_line(monitor.percent()),
            Line::default(),
        ];

        let status_style = match monitor.state() {
            InstallState::Failed(_) | InstallState::Aborted => theme().error(),
            InstallState::Completed => theme().success(),
            _ => theme().title(),
        };
        lines.push(Line::styled(
            t!("install.current", step = monitor.status()).to_string(),
            status_style,
        ));
        lines.push(Line::default());

        lines.push(Line::styled(t!("install.completed_steps").to_string(), theme().normal()));
        for step in STEPS.iter().take(monitor.cursor()) {
            lines.push(Line::styled(format!("✓ {}", step), theme().success()));
        }

        let output: Vec<&str> = monitor.recent_output().collect();
        if !output.is_empty() {
            lines.push(Line::default());
            for line in output {
                lines.push(Line::styled(truncate_value(line, OUTPUT_WIDTH), theme().hint()));
            }
        }

        lines.push(Line::default());
        let footer = match monitor.state() {
            InstallState::Completed => Line::styled(t!("install.success").to_string(), theme().success()),
            InstallState::Failed(_) => Line::styled(t!("install.failed").to_string(), theme().error()),
            InstallState::Aborted => Line::styled(t!("install.aborted").to_string(), theme().error()),
            _ => Line::styled(t!("install.do_not_power_off").to_string(), theme().error()),
        };
        lines.push(footer);

        if matches!(monitor.state(), InstallState::Failed(_) | InstallState::Aborted) {
            if let Some(path) = session.log_path() {
                lines.push(Line::styled(
                    t!("install.log_path", path = path.display()).to_string(),
                    theme().hint(),
                ));
            }
        }
        Text::from(lines)
    }

    fn monitor(&self) -> Option<&InstallMonitor> {
        Some(&self.monitor)
    }

    fn monitor_mut(&mut self) -> Option<&mut InstallMonitor> {
        Some(&mut self.monitor)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    fn settings(script: &str) -> InstallerSettings {
        InstallerSettings {
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".to_string(), script.to_string()],
        }
    }

    #[test]
    fn test_activation_freezes_and_writes_config() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("config.yaml");
        let mut page = InstallPage::new(
            settings("echo 'Partitioning disk...'"),
            Some(output.clone()),
            Duration::from_millis(10),
        );
        let mut session = Session::new();
        session.set_device("/dev/sda");

        let commands = page.init(&mut session);
        assert!(session.is_frozen());
        assert!(output.exists());
        assert!(matches!(
            &commands[..],
            [Command::Schedule { message: Message::CheckInstaller, .. }]
        ));

        // Re-activation never starts a second installer
        assert!(page.init(&mut session).is_empty());

        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            let next = page.handle(&mut session, &Message::CheckInstaller);
            if next.is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(page.monitor.state(), &InstallState::Completed);
    }

    #[test]
    fn test_spawn_failure_renders_failed() {
        let mut page = InstallPage::new(
            InstallerSettings {
                program: PathBuf::from("/nonexistent/installer"),
                args: Vec::new(),
            },
            None,
            Duration::from_millis(10),
        );
        let mut session = Session::with_log_path(PathBuf::from("/var/log/kairos-installer.log"));
        assert!(page.init(&mut session).is_empty());
        assert!(matches!(page.monitor.state(), InstallState::Failed(_)));

        let text = page.render(&session);
        let rendered: String = text
            .lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect();
        assert!(rendered.contains("Error:"));
        assert!(rendered.contains("/var/log/kairos-installer.log"));
    }
}
