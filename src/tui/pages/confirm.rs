//! Confirmation before the disk is wiped

use crate::session::Session;
use crate::tui::components::menu_lines;
use crate::tui::event::TuiEvent;
use crate::tui::page::{Command, Message, Page};
use crate::tui::state::SelectionState;
use crate::tui::theme::theme;
use ratatui::text::{Line, Text};
use rust_i18n::t;
use std::borrow::Cow;

pub const ID: &str = "confirmation";

const YES: usize = 0;
const NO: usize = 1;

pub struct ConfirmPage {
    selection: SelectionState,
}

impl ConfirmPage {
    pub fn new() -> Self {
        let mut selection = SelectionState::with_count(2);
        selection.select(NO);
        Self { selection }
    }
}

impl Default for ConfirmPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for ConfirmPage {
    fn id(&self) -> &str {
        ID
    }

    fn title(&self) -> Cow<'static, str> {
        t!("confirm.title").to_string().into()
    }

    fn help(&self) -> Cow<'static, str> {
        t!("help.menu").to_string().into()
    }

    fn init(&mut self, _session: &mut Session) -> Vec<Command> {
        self.selection.select(NO);
        Vec::new()
    }

    fn handle(&mut self, session: &mut Session, message: &Message) -> Vec<Command> {
        let Message::Key(event) = message else {
            return Vec::new();
        };
        if self.selection.handle(event) || *event != TuiEvent::Enter {
            return Vec::new();
        }
        match self.selection.selected() {
            YES => vec![Command::Advance],
            _ => {
                session.set_device("");
                vec![Command::goto(super::disk::ID)]
            }
        }
    }

    fn render(&self, session: &Session) -> Text<'static> {
        let items = [t!("confirm.yes").to_string(), t!("confirm.no").to_string()];
        let mut lines = vec![
            Line::styled(
                t!("confirm.selected", device = session.device()).to_string(),
                theme().normal(),
            ),
            Line::default(),
            Line::styled(
                t!("confirm.warning", device = session.device()).to_string(),
                theme().error(),
            ),
            Line::default(),
        ];
        lines.extend(menu_lines(&items, self.selection.selected()));
        Text::from(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enter(page: &mut ConfirmPage, session: &mut Session) -> Vec<Command> {
        page.handle(session, &Message::Key(TuiEvent::Enter))
    }

    #[test]
    fn test_defaults_to_no() {
        let mut page = ConfirmPage::new();
        let mut session = Session::new();
        session.set_device("/dev/sda");
        page.init(&mut session);

        let commands = enter(&mut page, &mut session);
        assert!(matches!(&commands[..], [Command::Goto(id)] if id == "disk_selection"));
        assert_eq!(session.device(), "");
    }

    #[test]
    fn test_yes_advances() {
        let mut page = ConfirmPage::new();
        let mut session = Session::new();
        session.set_device("/dev/sda");
        page.init(&mut session);
        page.handle(&mut session, &Message::Key(TuiEvent::Up));

        let commands = enter(&mut page, &mut session);
        assert!(matches!(&commands[..], [Command::Advance]));
        assert_eq!(session.device(), "/dev/sda");
    }
}
