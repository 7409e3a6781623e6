//! TUI application main module
//!
//! [`Wizard`] is the top-level controller: it routes keys to the
//! navigator, hijacks them while the installer runs, keeps the timer
//! queue and draws the frame. [`TuiApp`] owns the terminal and runs the
//! event loop around it.

use crate::installer::InstallState;
use crate::session::Session;
use crate::tui::components::{page_layout, render_hint, render_popup, title_block};
use crate::tui::event::{EventPoll, TuiEvent};
use crate::tui::nav::Navigator;
use crate::tui::page::{Command, Message, Page};
use crate::tui::theme::theme;
use ratatui::text::{Line, Text};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::{DefaultTerminal, Frame};
use rust_i18n::t;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Why the wizard ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Operator quit before installing
    Quit,
    /// Installation completed
    Finished,
    /// Installer killed on operator request
    Aborted,
    /// Installation failed
    Failed,
}

/// Top-level controller
pub struct Wizard {
    navigator: Navigator,
    session: Session,
    title: String,
    timers: Vec<(Instant, Message)>,
    deferred_check: bool,
    exit: Option<ExitReason>,
}

impl Wizard {
    pub fn new(pages: Vec<Box<dyn Page>>, session: Session, title: String) -> Self {
        let mut navigator = Navigator::new();
        for page in pages {
            navigator.register(page);
        }
        Self {
            navigator,
            session,
            title,
            timers: Vec::new(),
            deferred_check: false,
            exit: None,
        }
    }

    /// Activate the first page
    pub fn start(&mut self) {
        let commands = self.navigator.start(&mut self.session);
        self.run_commands(commands, Instant::now());
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.exit
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Number of pending timers
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn handle_event(&mut self, event: TuiEvent) {
        self.handle_event_at(event, Instant::now());
    }

    fn handle_event_at(&mut self, event: TuiEvent, now: Instant) {
        if !event.is_key() {
            return;
        }
        let on_install_page = self
            .navigator
            .current()
            .is_some_and(|page| page.monitor().is_some());
        if on_install_page {
            self.handle_install_key(event, now);
            return;
        }

        let captures_text = self
            .navigator
            .current()
            .is_some_and(|page| page.captures_text());
        match event {
            TuiEvent::CtrlC => self.quit(),
            TuiEvent::Char('q') if !captures_text => self.quit(),
            TuiEvent::Escape => {
                let commands = self.navigator.back(&mut self.session);
                self.run_commands(commands, now);
            }
            other => {
                let commands = self.navigator.dispatch(&mut self.session, &Message::Key(other));
                self.run_commands(commands, now);
            }
        }
    }

    /// Keys on the install page never reach the page itself
    fn handle_install_key(&mut self, event: TuiEvent, now: Instant) {
        let Some(monitor) = self.navigator.current_mut().and_then(|p| p.monitor_mut()) else {
            return;
        };

        if monitor.abort_requested() {
            match event {
                TuiEvent::Char('y') | TuiEvent::Char('Y') => {
                    monitor.confirm_abort();
                    self.exit = Some(ExitReason::Aborted);
                }
                TuiEvent::Char('n') | TuiEvent::Char('N') | TuiEvent::Escape => {
                    monitor.cancel_abort();
                    if self.deferred_check {
                        self.deferred_check = false;
                        self.timers.push((now, Message::CheckInstaller));
                    }
                }
                _ => {}
            }
        } else if monitor.is_running() {
            if event == TuiEvent::CtrlC {
                monitor.request_abort();
            }
        } else if monitor.is_terminal() {
            let reason = match monitor.state() {
                InstallState::Completed => ExitReason::Finished,
                InstallState::Aborted => ExitReason::Aborted,
                _ => ExitReason::Failed,
            };
            info!(?reason, "Leaving after installation");
            self.exit = Some(reason);
        } else if event == TuiEvent::CtrlC {
            self.exit = Some(ExitReason::Quit);
        }
    }

    /// Deliver every timer due at `now`.
    ///
    /// Installer checks are held back while the abort confirmation is
    /// shown, so nothing is drained behind the operator's back.
    pub fn fire_due_timers(&mut self, now: Instant) {
        if self.timers.is_empty() {
            return;
        }
        let (due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.timers).into_iter().partition(|(at, _)| *at <= now);
        self.timers = pending;

        for (_, message) in due {
            let abort_shown = self
                .navigator
                .current()
                .and_then(|p| p.monitor())
                .is_some_and(|m| m.abort_requested());
            if message == Message::CheckInstaller && abort_shown {
                debug!("Installer check deferred during abort confirmation");
                self.deferred_check = true;
                continue;
            }
            let commands = self.navigator.dispatch(&mut self.session, &message);
            self.run_commands(commands, now);
        }
    }

    fn run_commands(&mut self, commands: Vec<Command>, now: Instant) {
        for command in commands {
            match command {
                Command::Schedule { message, after } => self.timers.push((now + after, message)),
                Command::Quit => self.quit(),
                other => warn!(command = ?other, "Unexpected command at top level"),
            }
        }
    }

    fn quit(&mut self) {
        info!(page = %self.navigator.current_id(), "Operator quit");
        self.exit = Some(ExitReason::Quit);
    }

    /// Draw the whole frame
    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let block = title_block(&self.title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(page) = self.navigator.current() else {
            return;
        };
        let [body, help_area] = page_layout(inner);

        let mut lines = vec![theme().styled_line(page.title().into_owned(), theme().title()), Line::default()];
        lines.extend(page.render(&self.session).lines);
        frame.render_widget(
            Paragraph::new(Text::from(lines))
                .style(theme().normal())
                .wrap(Wrap { trim: false }),
            body,
        );

        let mut help = page.help().into_owned();
        if page.monitor().is_none() {
            help.push_str(&t!("help.global"));
        }
        render_hint(&help, frame, help_area);

        if page.monitor().is_some_and(|m| m.abort_requested()) {
            let lines = vec![
                Line::styled(t!("abort.title").to_string(), theme().error()),
                Line::default(),
                Line::styled(t!("abort.warning").to_string(), theme().normal()),
                Line::default(),
                Line::styled(t!("abort.keys").to_string(), theme().hint()),
            ];
            render_popup(frame, area, 56, 9, lines);
        }
    }
}

/// TUI application
pub struct TuiApp {
    /// Terminal
    terminal: DefaultTerminal,
    /// Event poller
    event_poll: EventPoll,
    wizard: Wizard,
}

impl TuiApp {
    /// Take over the terminal
    pub fn new(wizard: Wizard) -> std::io::Result<Self> {
        let terminal = ratatui::try_init()?;
        Ok(Self {
            terminal,
            event_poll: EventPoll::default(),
            wizard,
        })
    }

    /// Run until the wizard exits, then restore the terminal
    pub fn run(mut self) -> std::io::Result<ExitReason> {
        self.wizard.start();
        let result = self.event_loop();
        ratatui::restore();
        result
    }

    fn event_loop(&mut self) -> std::io::Result<ExitReason> {
        loop {
            self.terminal.draw(|frame| self.wizard.draw(frame))?;

            let event = self.event_poll.next();
            self.wizard.handle_event(event);
            self.wizard.fire_due_timers(Instant::now());

            if let Some(reason) = self.wizard.exit_reason() {
                return Ok(reason);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::{InstallMonitor, InstallRequest, InstallerEvent, Poll};
    use crate::tui::pages::{ConfirmPage, DiskPage, UserPage};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::borrow::Cow;
    use std::sync::mpsc;
    use std::time::Duration;

    const INTERVAL: Duration = Duration::from_millis(100);

    /// Install page stand-in fed from a test channel
    struct FakeInstall {
        monitor: InstallMonitor,
    }

    impl Page for FakeInstall {
        fn id(&self) -> &str {
            "install_process"
        }

        fn title(&self) -> Cow<'static, str> {
            Cow::Borrowed("Installing")
        }

        fn help(&self) -> Cow<'static, str> {
            Cow::Borrowed("")
        }

        fn init(&mut self, _session: &mut Session) -> Vec<Command> {
            vec![Command::Schedule {
                message: Message::CheckInstaller,
                after: Duration::ZERO,
            }]
        }

        fn handle(&mut self, _session: &mut Session, message: &Message) -> Vec<Command> {
            match (message, self.monitor.poll()) {
                (Message::CheckInstaller, Poll::Again(after)) => vec![Command::Schedule {
                    message: Message::CheckInstaller,
                    after,
                }],
                _ => Vec::new(),
            }
        }

        fn render(&self, _session: &Session) -> Text<'static> {
            Text::raw(self.monitor.status().to_string())
        }

        fn monitor(&self) -> Option<&InstallMonitor> {
            Some(&self.monitor)
        }

        fn monitor_mut(&mut self) -> Option<&mut InstallMonitor> {
            Some(&mut self.monitor)
        }
    }

    fn wizard_following(monitor: InstallMonitor) -> Wizard {
        let pages: Vec<Box<dyn Page>> = vec![Box::new(FakeInstall { monitor })];
        let mut wizard = Wizard::new(pages, Session::new(), "Test".to_string());
        wizard.start();
        wizard
    }

    fn install_wizard() -> (Wizard, mpsc::Sender<InstallerEvent>) {
        let (sender, receiver) = mpsc::channel();
        let mut monitor = InstallMonitor::new(INTERVAL);
        monitor.attach(receiver);
        (wizard_following(monitor), sender)
    }

    fn monitor(wizard: &Wizard) -> &InstallMonitor {
        wizard.navigator().current().and_then(|p| p.monitor()).unwrap()
    }

    #[test]
    fn test_keys_swallowed_while_running() {
        let (mut wizard, _sender) = install_wizard();
        let now = Instant::now();
        for event in [TuiEvent::Char('q'), TuiEvent::Escape, TuiEvent::Enter, TuiEvent::Char('y')] {
            wizard.handle_event_at(event, now);
        }
        assert_eq!(wizard.exit_reason(), None);
        assert!(monitor(&wizard).is_running());
        assert!(!monitor(&wizard).abort_requested());
    }

    #[test]
    fn test_abort_declined_resumes_polling() {
        let (mut wizard, sender) = install_wizard();
        let start = Instant::now();
        sender.send(InstallerEvent::Step(2)).unwrap();
        wizard.fire_due_timers(start);
        assert_eq!(monitor(&wizard).cursor(), 2);
        assert_eq!(wizard.pending_timers(), 1);

        wizard.handle_event_at(TuiEvent::CtrlC, start);
        assert!(monitor(&wizard).abort_requested());

        // The check falls due while the confirmation is shown
        sender.send(InstallerEvent::Step(4)).unwrap();
        wizard.fire_due_timers(start + Duration::from_secs(1));
        assert_eq!(monitor(&wizard).cursor(), 2);
        assert_eq!(wizard.pending_timers(), 0);

        wizard.handle_event_at(TuiEvent::Char('x'), start);
        assert!(monitor(&wizard).abort_requested());

        let resumed = start + Duration::from_secs(2);
        wizard.handle_event_at(TuiEvent::Char('n'), resumed);
        assert!(!monitor(&wizard).abort_requested());
        assert_eq!(monitor(&wizard).state(), &InstallState::Running);
        assert_eq!(monitor(&wizard).cursor(), 2);

        wizard.fire_due_timers(resumed);
        assert_eq!(monitor(&wizard).cursor(), 4);
        assert_eq!(wizard.pending_timers(), 1);
        assert_eq!(wizard.exit_reason(), None);
    }

    #[test]
    fn test_abort_confirmed_exits() {
        let (mut wizard, _sender) = install_wizard();
        let now = Instant::now();
        wizard.handle_event_at(TuiEvent::CtrlC, now);
        wizard.handle_event_at(TuiEvent::Char('Y'), now);
        assert_eq!(wizard.exit_reason(), Some(ExitReason::Aborted));
        assert_eq!(monitor(&wizard).state(), &InstallState::Aborted);
    }

    #[test]
    fn test_any_key_exits_after_completion() {
        let (mut wizard, sender) = install_wizard();
        let now = Instant::now();
        drop(sender);
        wizard.fire_due_timers(now);
        assert_eq!(monitor(&wizard).state(), &InstallState::Completed);
        assert_eq!(wizard.pending_timers(), 0);
        assert_eq!(wizard.exit_reason(), None);

        wizard.handle_event_at(TuiEvent::Char(' '), now);
        assert_eq!(wizard.exit_reason(), Some(ExitReason::Finished));
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_exit_reason() {
        let mut installer = InstallMonitor::new(Duration::from_millis(10));
        let request = InstallRequest::new("/bin/sh", vec!["-c".to_string(), "exit 1".to_string()]);
        installer.start(&request).unwrap();
        let mut wizard = wizard_following(installer);

        let deadline = Instant::now() + Duration::from_secs(10);
        while monitor(&wizard).is_running() && Instant::now() < deadline {
            wizard.fire_due_timers(Instant::now() + INTERVAL);
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(matches!(monitor(&wizard).state(), InstallState::Failed(_)));
        assert_eq!(wizard.pending_timers(), 0);

        wizard.handle_event_at(TuiEvent::Enter, Instant::now());
        assert_eq!(wizard.exit_reason(), Some(ExitReason::Failed));
    }

    fn form_wizard() -> Wizard {
        let disks = vec![crate::disks::Disk {
            name: "sda".to_string(),
            size: 64 << 30,
        }];
        let pages: Vec<Box<dyn Page>> = vec![
            Box::new(DiskPage::new(disks)),
            Box::new(ConfirmPage::new()),
            Box::new(UserPage::new()),
        ];
        let mut wizard = Wizard::new(pages, Session::new(), "Test".to_string());
        wizard.start();
        wizard
    }

    #[test]
    fn test_escape_goes_back() {
        let mut wizard = form_wizard();
        wizard.handle_event(TuiEvent::Enter);
        assert_eq!(wizard.navigator().current_id(), "confirmation");
        assert_eq!(wizard.session().device(), "/dev/sda");

        wizard.handle_event(TuiEvent::Escape);
        assert_eq!(wizard.navigator().current_id(), "disk_selection");
        wizard.handle_event(TuiEvent::Escape);
        assert_eq!(wizard.navigator().current_id(), "disk_selection");
        assert_eq!(wizard.exit_reason(), None);
    }

    #[test]
    fn test_q_quits_on_menu_but_not_on_text_page() {
        let mut wizard = form_wizard();
        wizard.handle_event(TuiEvent::Enter);
        wizard.handle_event(TuiEvent::Up);
        wizard.handle_event(TuiEvent::Enter);
        assert_eq!(wizard.navigator().current_id(), "user_password");

        wizard.handle_event(TuiEvent::Char('q'));
        assert_eq!(wizard.exit_reason(), None);

        wizard.handle_event(TuiEvent::CtrlC);
        assert_eq!(wizard.exit_reason(), Some(ExitReason::Quit));

        let mut wizard = form_wizard();
        wizard.handle_event(TuiEvent::Char('q'));
        assert_eq!(wizard.exit_reason(), Some(ExitReason::Quit));
    }

    #[test]
    fn test_draw_shows_title_and_abort_popup() {
        let (mut wizard, _sender) = install_wizard();
        wizard.handle_event_at(TuiEvent::CtrlC, Instant::now());

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| wizard.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Test"));
        assert!(content.contains("Installing"));
        assert!(content.contains("Abort"));
    }
}
