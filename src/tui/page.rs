//! Wizard page abstraction
//!
//! Pages own their local state, read and write the [`Session`] they are
//! handed, and answer every call with zero or more [`Command`]s for the
//! navigator.

use crate::installer::InstallMonitor;
use crate::session::Session;
use crate::tui::event::TuiEvent;
use ratatui::text::Text;
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

/// Input delivered to a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Key press or resize
    Key(TuiEvent),
    /// Timer asking the install page to drain installer notifications
    CheckInstaller,
}

/// Follow-up requested by a page
pub enum Command {
    /// Move to the next page in registry order
    Advance,
    /// Move to the page with this identifier
    Goto(String),
    /// Add a page to the registry unless its identifier is taken
    Register(Box<dyn Page>),
    /// Deliver `message` to the current page after `after`
    Schedule { message: Message, after: Duration },
    /// Leave the wizard
    Quit,
}

impl Command {
    pub fn goto(id: impl Into<String>) -> Self {
        Command::Goto(id.into())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Advance => write!(f, "Advance"),
            Command::Goto(id) => write!(f, "Goto({})", id),
            Command::Register(page) => write!(f, "Register({})", page.id()),
            Command::Schedule { message, after } => {
                write!(f, "Schedule({:?} after {:?})", message, after)
            }
            Command::Quit => write!(f, "Quit"),
        }
    }
}

/// One wizard screen
pub trait Page {
    /// Stable, unique identifier
    fn id(&self) -> &str;

    fn title(&self) -> Cow<'static, str>;

    /// Key help shown under the page
    fn help(&self) -> Cow<'static, str>;

    /// Called each time the page becomes current
    fn init(&mut self, _session: &mut Session) -> Vec<Command> {
        Vec::new()
    }

    fn handle(&mut self, session: &mut Session, message: &Message) -> Vec<Command>;

    fn render(&self, session: &Session) -> Text<'static>;

    /// Pages with a text field receive `q` as input instead of quitting
    fn captures_text(&self) -> bool {
        false
    }

    /// Installation monitor, for the install page only
    fn monitor(&self) -> Option<&InstallMonitor> {
        None
    }

    fn monitor_mut(&mut self) -> Option<&mut InstallMonitor> {
        None
    }
}
